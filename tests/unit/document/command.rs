use super::*;
use crate::error::SymbolError;
use crate::models::{symbols, Cursor};

type Snapshot = Vec<(NodePath, NodeKind, Vec<Tag>, Option<Link>)>;

fn snapshot(doc: &Document) -> Snapshot {
    let tree = doc.tree();
    tree.descendants(tree.root())
        .map(|id| {
            let node = tree.get(id).unwrap();
            (
                tree.path_of(id),
                node.kind().clone(),
                node.tags().iter().copied().collect(),
                node.link().cloned(),
            )
        })
        .collect()
}

fn lines(doc: &Document) -> Vec<String> {
    let tree = doc.tree();
    tree.children(tree.root())
        .iter()
        .map(|&line| {
            tree.descendants(line)
                .filter_map(|id| match tree.kind(id)? {
                    NodeKind::Char(c) => Some(*c),
                    NodeKind::MathSymbol(s) => symbols::glyph_for_content(s).ok(),
                    NodeKind::Eol => Some('¶'),
                    NodeKind::Placeholder => Some('□'),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

fn leaves(doc: &Document) -> Vec<NodeId> {
    doc.tree().leaves().collect()
}

/// Document holding `text` with the cursor at the very start.
fn doc_with(text: &str) -> Document {
    let mut doc = Document::new();
    doc.insert_text_at_cursor(text).unwrap();
    let first = doc.tree.first_leaf(doc.tree.root());
    doc.cursor = Cursor::new(first);
    doc
}

fn run(doc: &mut Document, command: Command) -> AppliedCommand {
    AppliedCommand::run(command, doc).unwrap()
}

#[test]
fn test_insert_char_and_undo() {
    let mut doc = doc_with("ab");
    let before = snapshot(&doc);
    let cursor = doc.cursor_state();

    doc.move_cursor_by_offset(1);
    let at_b = doc.cursor_state();
    let applied = run(&mut doc, Command::InsertChar('x'));
    assert_eq!(lines(&doc), ["axb¶"]);
    // The cursor stays in front of the same leaf.
    assert_eq!(doc.tree.kind(doc.cursor.get_node()), Some(&NodeKind::Char('b')));
    assert_eq!(applied.before(), &at_b);

    applied.undo(&mut doc).unwrap();
    doc.restore_cursor(&cursor).unwrap();
    assert_eq!(snapshot(&doc), before);
}

#[test]
fn test_linebreak_then_delete_restores_the_line() {
    let mut doc = doc_with("abcd");
    let before = snapshot(&doc);
    doc.move_cursor_by_offset(2);

    run(&mut doc, Command::Linebreak);
    assert_eq!(lines(&doc), ["ab¶", "cd¶"]);
    assert_eq!(doc.tree.kind(doc.cursor.get_node()), Some(&NodeKind::Char('c')));

    doc.move_cursor_by_offset(-1);
    let applied = run(&mut doc, Command::DeleteChar);
    assert!(applied.changes_tree());
    assert_eq!(snapshot(&doc), before);
    assert_eq!(doc.tree.kind(doc.cursor.get_node()), Some(&NodeKind::Char('c')));
}

#[test]
fn test_linebreak_inside_math_splits_before_the_list() {
    let mut doc = doc_with("a");
    doc.move_cursor_by_offset(1);
    let list = doc.tree.create_math_list();
    let line = doc.tree.get_child(doc.tree.root(), 0).unwrap();
    doc.tree.insert(line, 1, list).unwrap();
    let placeholder = doc.tree.first_leaf(list);
    doc.cursor.set_node(placeholder);

    run(&mut doc, Command::Linebreak);
    assert_eq!(lines(&doc), ["a¶", "□¶"]);
    assert_eq!(doc.cursor.get_node(), placeholder);
}

#[test]
fn test_delete_at_document_end_is_a_noop() {
    let mut doc = doc_with("a");
    doc.move_cursor_by_offset(1);
    let applied = run(&mut doc, Command::DeleteChar);
    assert!(!applied.changes_tree());
    assert_eq!(lines(&doc), ["a¶"]);
}

#[test]
fn test_undo_merge_restores_eol_attributes() {
    let mut doc = doc_with("a\nb");
    let eol = leaves(&doc)[1];
    doc.tree.add_tag(eol, Tag::Bold);
    doc.tree.set_link(eol, Some(Link::new("x", "x")));
    let before = snapshot(&doc);
    doc.cursor.set_node(eol);

    let applied = run(&mut doc, Command::DeleteChar);
    assert_eq!(lines(&doc), ["ab¶"]);
    applied.undo(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), before);
    assert_eq!(doc.cursor.get_node(), leaves(&doc)[1]);
}

#[test]
fn test_toggle_tag_over_mixed_selection_adds_to_all() {
    let mut doc = doc_with("abc");
    let l = leaves(&doc);
    doc.tree.add_tag(l[1], Tag::Bold);
    doc.cursor.set_selection(l[0], l[3]);

    let first = run(&mut doc, Command::ToggleTag(Tag::Bold));
    assert!(l[..3].iter().all(|&leaf| doc.tree.has_tag(leaf, Tag::Bold)));
    // End-of-line markers never carry styles.
    assert!(!doc.tree.has_tag(l[3], Tag::Bold));

    let second = run(&mut doc, Command::ToggleTag(Tag::Bold));
    assert!(l[..3].iter().all(|&leaf| !doc.tree.has_tag(leaf, Tag::Bold)));

    second.undo(&mut doc).unwrap();
    first.undo(&mut doc).unwrap();
    assert!(!doc.tree.has_tag(l[0], Tag::Bold));
    assert!(doc.tree.has_tag(l[1], Tag::Bold));
    assert!(!doc.tree.has_tag(l[2], Tag::Bold));
}

#[test]
fn test_tags_without_selection_change_nothing() {
    let mut doc = doc_with("abc");
    let applied = run(&mut doc, Command::AddTag(Tag::Italic));
    assert!(!applied.changes_tree());
}

#[test]
fn test_set_link_and_undo() {
    let mut doc = doc_with("ab");
    let l = leaves(&doc);
    doc.cursor.set_selection(l[0], l[1]);
    let link = Link::new("n", "n");

    let applied = run(&mut doc, Command::SetLink(Some(link.clone())));
    assert_eq!(doc.tree.link(l[0]), Some(&link));
    assert_eq!(doc.tree.link(l[1]), None);

    applied.undo(&mut doc).unwrap();
    assert_eq!(doc.tree.link(l[0]), None);
    assert_eq!(doc.cursor.anchor(), l[0]);
    assert_eq!(doc.cursor.get_node(), l[1]);
}

#[test]
fn test_backspace_joins_lines() {
    let mut doc = doc_with("a\nb");
    let before = snapshot(&doc);
    let b = leaves(&doc)[2];
    doc.cursor.set_node(b);

    let applied = run(&mut doc, Command::Backspace);
    assert_eq!(lines(&doc), ["ab¶"]);
    assert_eq!(doc.tree.kind(doc.cursor.get_node()), Some(&NodeKind::Char('b')));

    applied.undo(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), before);
    assert_eq!(doc.tree.kind(doc.cursor.get_node()), Some(&NodeKind::Char('b')));
    assert_eq!(doc.tree.path_of(doc.cursor.get_node()), NodePath::new(vec![1, 0]));
}

#[test]
fn test_backspace_at_document_start_changes_nothing() {
    let mut doc = doc_with("a");
    let applied = run(&mut doc, Command::Backspace);
    assert!(!applied.changes_tree());
    assert_eq!(lines(&doc), ["a¶"]);
}

#[test]
fn test_delete_selection_across_lines() {
    let mut doc = doc_with("ab\ncd");
    let before = snapshot(&doc);
    let l = leaves(&doc);
    // Anchor on `d`, insert on `b`: the bounds are normalized.
    doc.cursor.set_selection(l[4], l[1]);

    let applied = run(&mut doc, Command::DeleteSelection);
    assert_eq!(lines(&doc), ["ad¶"]);
    assert_eq!(doc.tree.kind(doc.cursor.get_node()), Some(&NodeKind::Char('d')));
    assert!(!doc.cursor.has_selection());

    applied.undo(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), before);
    let l = leaves(&doc);
    assert_eq!(doc.cursor.anchor(), l[4]);
    assert_eq!(doc.cursor.get_node(), l[1]);
}

#[test]
fn test_insert_text_replaces_selection() {
    let mut doc = doc_with("abc");
    let l = leaves(&doc);
    doc.cursor.set_selection(l[1], l[2]);
    run(&mut doc, Command::InsertText("x\ny".into()));
    assert_eq!(lines(&doc), ["ax¶", "yc¶"]);
}

#[test]
fn test_unknown_symbol_fails_without_mutation() {
    let mut doc = doc_with("a");
    let before = snapshot(&doc);
    let cursor = doc.cursor_state();

    let err = AppliedCommand::run(Command::InsertSymbol("notasymbol".into()), &mut doc).unwrap_err();
    assert!(matches!(
        err,
        CommandError::Symbol(SymbolError::UnknownSymbol(ref name)) if name == "notasymbol"
    ));
    assert_eq!(snapshot(&doc), before);
    assert_eq!(doc.cursor_state(), cursor);
}

#[test]
fn test_composite_rolls_back_on_failure() {
    let mut doc = doc_with("a");
    let before = snapshot(&doc);
    let cursor = doc.cursor_state();

    let composite = Command::Composite(vec![
        Command::InsertChar('x'),
        Command::Linebreak,
        Command::InsertSymbol("bogus".into()),
    ]);
    assert!(AppliedCommand::run(composite, &mut doc).is_err());
    assert_eq!(snapshot(&doc), before);
    assert_eq!(doc.cursor_state(), cursor);
}

#[test]
fn test_composite_undo_runs_in_reverse() {
    let mut doc = doc_with("");
    let before = snapshot(&doc);
    let composite = Command::Composite(vec![
        Command::InsertSymbol("alpha".into()),
        Command::MoveCursor(-1),
        Command::InsertChar('x'),
    ]);
    let applied = run(&mut doc, composite);
    assert_eq!(lines(&doc), ["xα¶"]);

    applied.undo(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), before);
}

#[test]
fn test_delete_selection_removes_fully_selected_math_list() {
    let mut doc = doc_with("ab");
    let l = leaves(&doc);
    let line = doc.tree.get_child(doc.tree.root(), 0).unwrap();
    let list = doc.tree.create_math_list();
    doc.tree.insert(line, 1, list).unwrap();
    let before = snapshot(&doc);
    // a [□] b ¶ : select from `a` up to `¶`
    doc.cursor.set_selection(l[0], l[2]);

    let applied = run(&mut doc, Command::DeleteSelection);
    assert_eq!(lines(&doc), ["¶"]);
    assert!(!doc.tree.contains(list));

    applied.undo(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), before);
}

#[test]
fn test_delete_selection_steps_over_partly_selected_math_list() {
    let mut doc = doc_with("ab");
    let line = doc.tree.get_child(doc.tree.root(), 0).unwrap();
    let list = doc.tree.create_math_list();
    let x = doc.tree.create(NodeKind::MathSymbol("x".into()));
    doc.tree.insert(list, 0, x).unwrap();
    doc.tree.insert(line, 1, list).unwrap();
    let l = leaves(&doc);
    let before = snapshot(&doc);
    // a [x □] b ¶ : select from the end slot up to `¶`
    doc.cursor.set_selection(l[2], l[4]);

    let applied = run(&mut doc, Command::DeleteSelection);
    assert_eq!(lines(&doc), ["ax□¶"]);

    applied.undo(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), before);
}

#[test]
fn test_delete_on_empty_math_list_removes_it() {
    let mut doc = doc_with("a");
    let line = doc.tree.get_child(doc.tree.root(), 0).unwrap();
    let list = doc.tree.create_math_list();
    doc.tree.insert(line, 1, list).unwrap();
    let before = snapshot(&doc);
    doc.cursor.set_node(doc.tree.first_leaf(list));
    let at_slot = doc.cursor_state();

    let applied = run(&mut doc, Command::DeleteChar);
    assert_eq!(lines(&doc), ["a¶"]);
    assert_eq!(doc.tree.kind(doc.cursor.get_node()), Some(&NodeKind::Eol));

    applied.undo(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), before);
    assert_eq!(doc.cursor_state(), at_slot);
}

#[test]
fn test_delete_on_end_slot_of_filled_math_list_is_a_noop() {
    let mut doc = doc_with("a");
    let line = doc.tree.get_child(doc.tree.root(), 0).unwrap();
    let list = doc.tree.create_math_list();
    let x = doc.tree.create(NodeKind::MathSymbol("x".into()));
    doc.tree.insert(list, 0, x).unwrap();
    doc.tree.insert(line, 1, list).unwrap();
    doc.cursor.set_node(doc.tree.last_leaf(list));

    let applied = run(&mut doc, Command::DeleteChar);
    assert!(!applied.changes_tree());
    assert_eq!(lines(&doc), ["ax□¶"]);
}

#[test]
fn test_select_all_backspace_clears_imported_math() {
    let mut doc = Document::new();
    doc.run(Command::PopulateFromHtml(
        "<head><title>t</title></head><body>a<math>x</math></body>".to_string(),
    ))
    .unwrap();
    assert_eq!(doc.markdown(), "# t\na$`x`$");

    doc.run(Command::SelectAll).unwrap();
    doc.run(Command::Backspace).unwrap();
    assert_eq!(doc.markdown(), "# t\n");
    assert_eq!(lines(&doc), ["¶"]);

    assert!(doc.undo());
    assert_eq!(doc.markdown(), "# t\na$`x`$");
}

#[test]
fn test_command_classification() {
    assert!(Command::MoveCursor(1).is_cursor_only());
    assert!(Command::Composite(vec![Command::SelectAll, Command::MoveToLineEnd]).is_cursor_only());
    assert!(!Command::InsertChar('a').is_cursor_only());
    assert!(!Command::PopulateFromHtml(String::new()).is_undoable());
    assert!(!Command::Composite(vec![Command::PopulateFromHtml(String::new())]).is_undoable());
    assert!(!Command::MoveVertical(1).updates_implicit_x());
    assert_eq!(Command::Backspace.name(), "backspace");
}

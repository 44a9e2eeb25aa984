use super::*;

fn lines(tree: &NodeTree) -> Vec<String> {
    tree.children(tree.root())
        .iter()
        .map(|&line| {
            tree.descendants(line)
                .filter_map(|id| match tree.kind(id)? {
                    NodeKind::Char(c) => Some(*c),
                    NodeKind::MathSymbol(s) => s.chars().next(),
                    NodeKind::Eol => Some('¶'),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

#[test]
fn test_title_and_body() {
    let note = parse_html(
        "<!DOCTYPE html><html><head><title>Groceries</title></head><body>abc</body></html>",
    )
    .unwrap();
    assert_eq!(note.title.as_deref(), Some("Groceries"));
    assert_eq!(lines(&note.tree), ["abc¶"]);
}

#[test]
fn test_empty_body_yields_one_empty_line() {
    let note = parse_html("<html><head></head><body></body></html>").unwrap();
    assert_eq!(note.title, None);
    assert_eq!(lines(&note.tree), ["¶"]);
}

#[test]
fn test_br_splits_lines_and_newlines_are_dropped() {
    let note = parse_html("<body>one<br>two\n<br/>three</body>").unwrap();
    assert_eq!(lines(&note.tree), ["one¶", "two¶", "three¶"]);
}

#[test]
fn test_strong_and_em_set_tags() {
    let note = parse_html("<body>a<strong>b<em>c</em></strong>d</body>").unwrap();
    let tree = &note.tree;
    let tags: Vec<Vec<Tag>> = tree
        .leaves()
        .filter(|&id| tree.kind(id) != Some(&NodeKind::Eol))
        .map(|id| tree.tags(id).unwrap().iter().copied().collect())
        .collect();
    assert_eq!(
        tags,
        [
            vec![],
            vec![Tag::Bold],
            vec![Tag::Bold, Tag::Italic],
            vec![]
        ]
    );
}

#[test]
fn test_anchor_href_becomes_link() {
    let note = parse_html(r#"<body><a href="my+note%21">x</a>y</body>"#).unwrap();
    let tree = &note.tree;
    let leaves: Vec<_> = tree.leaves().collect();
    let link = tree.link(leaves[0]).unwrap();
    assert_eq!(link.source(), "my+note%21");
    assert_eq!(link.target(), "my note!");
    assert!(tree.link(leaves[1]).is_none());
}

#[test]
fn test_math_text_becomes_symbols_in_a_math_list() {
    let note = parse_html("<body>a<math>x+y</math>b</body>").unwrap();
    let tree = &note.tree;
    let line = tree.get_child(tree.root(), 0).unwrap();
    let list = tree.get_child(line, 1).unwrap();
    assert_eq!(tree.kind(list), Some(&NodeKind::MathList));
    let kinds: Vec<_> = tree.children(list).iter().map(|&c| tree.kind(c).cloned()).collect();
    assert_eq!(
        kinds,
        [
            Some(NodeKind::MathSymbol("x".into())),
            Some(NodeKind::MathSymbol("+".into())),
            Some(NodeKind::MathSymbol("y".into())),
            Some(NodeKind::Placeholder),
        ]
    );
    assert_eq!(lines(tree), ["ax+yb¶"]);
}

#[test]
fn test_style_and_script_text_is_ignored() {
    let note = parse_html("<head><style>p { }</style></head><body>ok<script>x</script></body>")
        .unwrap();
    assert_eq!(lines(&note.tree), ["ok¶"]);
}

#[test]
fn test_unclosed_tags_are_tolerated() {
    let note = parse_html("<body><p>a<strong>b</p>c</body>").unwrap();
    let tree = &note.tree;
    let leaves: Vec<_> = tree.leaves().collect();
    assert!(tree.has_tag(leaves[1], Tag::Bold));
    // Closing </p> also closed the <strong> opened inside it.
    assert!(!tree.has_tag(leaves[2], Tag::Bold));
}

#[test]
fn test_html_entities_survive() {
    let note = parse_html("<body>a &amp; b</body>").unwrap();
    assert_eq!(lines(&note.tree), ["a & b¶"]);
}

#[test]
fn test_html_named_entities_decode_alongside_xml_ones() {
    let note = parse_html("<body>a&nbsp;b &amp; c&mdash;d</body>").unwrap();
    assert_eq!(lines(&note.tree), ["a\u{a0}b & c\u{2014}d¶"]);
}

#[test]
fn test_math_keeps_every_character() {
    let note = parse_html("<body><math>x + y</math></body>").unwrap();
    let tree = &note.tree;
    let line = tree.get_child(tree.root(), 0).unwrap();
    let list = tree.get_child(line, 0).unwrap();
    let symbols: Vec<_> = tree
        .children(list)
        .iter()
        .filter_map(|&id| match tree.kind(id)? {
            NodeKind::MathSymbol(s) => Some(s.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(symbols, ["x", " ", "+", " ", "y"]);
}

#[test]
fn test_unquoted_href_keeps_the_link() {
    let note = parse_html("<body><a href=foo>x</a></body>").unwrap();
    let tree = &note.tree;
    let x = tree.leaves().next().unwrap();
    assert_eq!(tree.link(x).map(|l| l.target()), Some("foo"));
}

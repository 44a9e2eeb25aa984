//! Reversible edit commands.
//!
//! [`Command`] is what callers issue. Running it yields an
//! [`AppliedCommand`] that carries the minimal data to revert the edit,
//! plus the cursor before and after as structural paths. Paths stay valid
//! when undo recreates nodes, so any interleaving of undo and redo replays
//! against the same structure.

use compact_str::CompactString;

use crate::error::{CommandError, TreeError};
use crate::models::{get_subtree, CursorState, LeafData, Link, NodeId, NodeKind, NodePath, NodeTree, Tag};

use super::{DeletedNode, Document, Removal};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    InsertChar(char),
    /// Macro name (`alpha`) or a single literal glyph.
    InsertSymbol(CompactString),
    Linebreak,
    /// Deletes the leaf after the cursor, merging lines at an end-of-line.
    DeleteChar,
    Backspace,
    DeleteSelection,
    /// `\n` becomes a line break. Replaces the selection, if any.
    InsertText(String),
    AddTag(Tag),
    RemoveTag(Tag),
    /// Adds the tag to every selected leaf unless all of them carry it
    /// already, in which case it is removed from all.
    ToggleTag(Tag),
    SetLink(Option<Link>),
    MoveCursor(isize),
    ExtendSelection(isize),
    MoveToLineStart,
    MoveToLineEnd,
    /// Moves by display lines, keeping the implicit x position.
    MoveVertical(isize),
    MoveToXy {
        x: f32,
        y: f32,
    },
    SelectAll,
    /// Replaces the whole document. Not undoable; clears the history.
    PopulateFromHtml(String),
    Composite(Vec<Command>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::InsertChar(_) => "insert_char",
            Command::InsertSymbol(_) => "insert_symbol",
            Command::Linebreak => "linebreak",
            Command::DeleteChar => "delete_char",
            Command::Backspace => "backspace",
            Command::DeleteSelection => "delete_selection",
            Command::InsertText(_) => "insert_text",
            Command::AddTag(_) => "add_tag",
            Command::RemoveTag(_) => "remove_tag",
            Command::ToggleTag(_) => "toggle_tag",
            Command::SetLink(_) => "set_link",
            Command::MoveCursor(_) => "move_cursor",
            Command::ExtendSelection(_) => "extend_selection",
            Command::MoveToLineStart => "move_to_line_start",
            Command::MoveToLineEnd => "move_to_line_end",
            Command::MoveVertical(_) => "move_vertical",
            Command::MoveToXy { .. } => "move_to_xy",
            Command::SelectAll => "select_all",
            Command::PopulateFromHtml(_) => "populate_from_html",
            Command::Composite(_) => "composite",
        }
    }

    pub fn is_cursor_only(&self) -> bool {
        match self {
            Command::MoveCursor(_)
            | Command::ExtendSelection(_)
            | Command::MoveToLineStart
            | Command::MoveToLineEnd
            | Command::MoveVertical(_)
            | Command::MoveToXy { .. }
            | Command::SelectAll => true,
            Command::Composite(children) => children.iter().all(Command::is_cursor_only),
            _ => false,
        }
    }

    pub fn is_undoable(&self) -> bool {
        match self {
            Command::PopulateFromHtml(_) => false,
            Command::Composite(children) => children.iter().all(Command::is_undoable),
            _ => true,
        }
    }

    /// Vertical movement is the only command that keeps the remembered x.
    pub fn updates_implicit_x(&self) -> bool {
        !matches!(self, Command::MoveVertical(_))
    }
}

#[derive(Debug, Clone)]
enum Inverse {
    /// Cursor-only command or an edit that changed nothing.
    Nothing,
    RemoveLeaf {
        parent: NodePath,
        index: usize,
    },
    RestoreLeaf {
        parent: NodePath,
        index: usize,
        data: LeafData,
    },
    RestoreMathList {
        line: NodePath,
        index: usize,
    },
    JoinLines {
        line: usize,
    },
    SplitLine {
        line: usize,
        at: usize,
        eol: LeafData,
    },
    Tags {
        tag: Tag,
        added: Vec<NodePath>,
        removed: Vec<NodePath>,
    },
    Links(Vec<(NodePath, Option<Link>)>),
    Composite(Vec<AppliedCommand>),
}

impl Inverse {
    fn changes_tree(&self) -> bool {
        match self {
            Inverse::Nothing => false,
            Inverse::Tags { added, removed, .. } => !added.is_empty() || !removed.is_empty(),
            Inverse::Links(changes) => !changes.is_empty(),
            Inverse::Composite(children) => children.iter().any(AppliedCommand::changes_tree),
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppliedCommand {
    command: Command,
    inverse: Inverse,
    before: CursorState,
    after: CursorState,
}

impl AppliedCommand {
    /// Applies `command`. On failure the tree is left as it was and the
    /// cursor is put back where it started.
    pub fn run(command: Command, doc: &mut Document) -> Result<Self, CommandError> {
        let before = doc.cursor_state();
        let inverse = match apply(&command, doc) {
            Ok(inverse) => inverse,
            Err(err) => {
                if let Err(restore) = doc.restore_cursor(&before) {
                    tracing::error!(error = %restore, "failed to restore cursor");
                }
                return Err(err);
            }
        };
        let after = doc.cursor_state();
        Ok(Self {
            command,
            inverse,
            before,
            after,
        })
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn before(&self) -> &CursorState {
        &self.before
    }

    pub fn after(&self) -> &CursorState {
        &self.after
    }

    pub fn changes_tree(&self) -> bool {
        self.inverse.changes_tree()
    }

    pub(crate) fn is_word_char(&self) -> bool {
        matches!(self.command, Command::InsertChar(c) if !c.is_whitespace())
    }

    pub fn undo(&self, doc: &mut Document) -> Result<(), CommandError> {
        revert(&self.inverse, doc)?;
        doc.restore_cursor(&self.before)?;
        Ok(())
    }

    /// Reapplies the command from its recorded starting cursor.
    pub fn redo(&self, doc: &mut Document) -> Result<Self, CommandError> {
        doc.restore_cursor(&self.before)?;
        Self::run(self.command.clone(), doc)
    }
}

/// Children applied so far by a multi-step command. A failing step rolls
/// back the earlier ones, newest first.
struct Sequence {
    applied: Vec<AppliedCommand>,
}

impl Sequence {
    fn new() -> Self {
        Self {
            applied: Vec::new(),
        }
    }

    /// Returns whether the step had any effect on the tree or the cursor.
    fn step(&mut self, doc: &mut Document, command: Command) -> Result<bool, CommandError> {
        match AppliedCommand::run(command, doc) {
            Ok(applied) => {
                let effective = applied.changes_tree() || applied.before != applied.after;
                self.applied.push(applied);
                Ok(effective)
            }
            Err(err) => {
                for applied in self.applied.drain(..).rev() {
                    if let Err(rollback) = applied.undo(doc) {
                        tracing::error!(error = %rollback, "rollback failed");
                    }
                }
                Err(err)
            }
        }
    }

    fn finish(self) -> Inverse {
        Inverse::Composite(self.applied)
    }
}

fn apply(command: &Command, doc: &mut Document) -> Result<Inverse, CommandError> {
    let inverse = match command {
        Command::InsertChar(c) => {
            let leaf = doc.insert_character(*c)?;
            removal_of(&doc.tree, leaf)?
        }
        Command::InsertSymbol(name) => {
            let leaf = doc.insert_math_symbol(name)?;
            removal_of(&doc.tree, leaf)?
        }
        Command::Linebreak => Inverse::JoinLines {
            line: doc.insert_linebreak()?,
        },
        Command::DeleteChar => match doc.delete_char_at_cursor()? {
            None => Inverse::Nothing,
            Some(DeletedNode { data, removal }) => match removal {
                Removal::Leaf { parent, index } => Inverse::RestoreLeaf {
                    parent,
                    index,
                    data,
                },
                Removal::LineBoundary { line, at } => Inverse::SplitLine { line, at, eol: data },
                Removal::MathList { line, index } => Inverse::RestoreMathList { line, index },
            },
        },
        Command::Backspace => {
            let mut seq = Sequence::new();
            if doc.cursor.has_selection() {
                seq.step(doc, Command::DeleteSelection)?;
            } else if seq.step(doc, Command::MoveCursor(-1))? {
                seq.step(doc, Command::DeleteChar)?;
            }
            seq.finish()
        }
        Command::DeleteSelection => delete_selection(doc)?,
        Command::InsertText(text) => {
            let mut seq = Sequence::new();
            if doc.cursor.has_selection() {
                seq.step(doc, Command::DeleteSelection)?;
            }
            for c in text.chars() {
                let step = match c {
                    '\n' => Command::Linebreak,
                    '\r' => continue,
                    c => Command::InsertChar(c),
                };
                seq.step(doc, step)?;
            }
            seq.finish()
        }
        Command::AddTag(tag) => set_tag(doc, *tag, true),
        Command::RemoveTag(tag) => set_tag(doc, *tag, false),
        Command::ToggleTag(tag) => {
            let leaves = selected_leaves(doc);
            let all_tagged = leaves.iter().all(|&leaf| doc.tree.has_tag(leaf, *tag));
            set_tag(doc, *tag, !all_tagged)
        }
        Command::SetLink(link) => {
            let mut changes = Vec::new();
            for leaf in selected_leaves(doc) {
                let previous = doc.tree.set_link(leaf, link.clone());
                if previous != *link {
                    changes.push((doc.tree.path_of(leaf), previous));
                }
            }
            Inverse::Links(changes)
        }
        Command::MoveCursor(offset) => {
            doc.move_cursor_by_offset(*offset);
            Inverse::Nothing
        }
        Command::ExtendSelection(offset) => {
            doc.extend_selection_by_offset(*offset);
            Inverse::Nothing
        }
        Command::MoveToLineStart => {
            doc.move_cursor_to_line_start();
            Inverse::Nothing
        }
        Command::MoveToLineEnd => {
            doc.move_cursor_to_line_end();
            Inverse::Nothing
        }
        Command::MoveVertical(lines) => {
            doc.move_cursor_vertically(*lines);
            Inverse::Nothing
        }
        Command::MoveToXy { x, y } => {
            doc.move_cursor_to_xy(*x, *y);
            Inverse::Nothing
        }
        Command::SelectAll => {
            doc.select_all();
            Inverse::Nothing
        }
        Command::PopulateFromHtml(html) => {
            doc.populate_from_html(html)?;
            Inverse::Nothing
        }
        Command::Composite(children) => {
            let mut seq = Sequence::new();
            for child in children {
                seq.step(doc, child.clone())?;
            }
            seq.finish()
        }
    };
    Ok(inverse)
}

fn revert(inverse: &Inverse, doc: &mut Document) -> Result<(), CommandError> {
    match inverse {
        Inverse::Nothing => {}
        Inverse::RemoveLeaf { parent, index } => {
            let parent = resolve(&doc.tree, parent)?;
            let leaf = doc
                .tree
                .get_child(parent, *index as isize)
                .ok_or(TreeError::InvalidNodeId(parent))?;
            doc.tree.delete(leaf)?;
        }
        Inverse::RestoreLeaf {
            parent,
            index,
            data,
        } => {
            let parent = resolve(&doc.tree, parent)?;
            let leaf = doc.tree.create_leaf(data.clone());
            if let Err(err) = doc.tree.insert(parent, *index, leaf) {
                doc.tree.delete(leaf)?;
                return Err(err.into());
            }
        }
        Inverse::RestoreMathList { line, index } => {
            let line = resolve(&doc.tree, line)?;
            let list = doc.tree.create_math_list();
            if let Err(err) = doc.tree.insert(line, *index, list) {
                doc.tree.delete(list)?;
                return Err(err.into());
            }
        }
        Inverse::JoinLines { line } => {
            doc.merge_lines_at(*line)?;
        }
        Inverse::SplitLine { line, at, eol } => {
            let (first, _) = doc.split_line_at(*line, *at)?;
            let marker = doc.tree.last_leaf(first);
            for tag in &eol.tags {
                doc.tree.add_tag(marker, *tag);
            }
            doc.tree.set_link(marker, eol.link.clone());
        }
        Inverse::Tags {
            tag,
            added,
            removed,
        } => {
            for path in added {
                let leaf = resolve(&doc.tree, path)?;
                doc.tree.remove_tag(leaf, *tag);
            }
            for path in removed {
                let leaf = resolve(&doc.tree, path)?;
                doc.tree.add_tag(leaf, *tag);
            }
        }
        Inverse::Links(changes) => {
            for (path, previous) in changes {
                let leaf = resolve(&doc.tree, path)?;
                doc.tree.set_link(leaf, previous.clone());
            }
        }
        Inverse::Composite(children) => {
            for child in children.iter().rev() {
                child.undo(doc)?;
            }
        }
    }
    Ok(())
}

fn resolve(tree: &NodeTree, path: &NodePath) -> Result<NodeId, TreeError> {
    tree.node_at_path(path)
        .ok_or_else(|| TreeError::InvalidPath(path.clone()))
}

fn removal_of(tree: &NodeTree, leaf: NodeId) -> Result<Inverse, TreeError> {
    let parent = tree.parent(leaf).ok_or(TreeError::InvalidNodeId(leaf))?;
    let index = tree.get_index(parent, leaf)?;
    Ok(Inverse::RemoveLeaf {
        parent: tree.path_of(parent),
        index,
    })
}

/// Selected leaves that can carry styles and links.
fn selected_leaves(doc: &Document) -> Vec<NodeId> {
    if !doc.cursor.has_selection() {
        return Vec::new();
    }
    let (start, end) = doc.cursor.selection_bounds(&doc.tree);
    get_subtree(&doc.tree, start, end)
        .into_iter()
        .filter(|&leaf| doc.tree.kind(leaf).is_some_and(|k| !k.is_structural()))
        .collect()
}

fn set_tag(doc: &mut Document, tag: Tag, add: bool) -> Inverse {
    let mut changed = Vec::new();
    for leaf in selected_leaves(doc) {
        let did_change = if add {
            doc.tree.add_tag(leaf, tag)
        } else {
            doc.tree.remove_tag(leaf, tag)
        };
        if did_change {
            changed.push(doc.tree.path_of(leaf));
        }
    }
    if add {
        Inverse::Tags {
            tag,
            added: changed,
            removed: Vec::new(),
        }
    } else {
        Inverse::Tags {
            tag,
            added: Vec::new(),
            removed: changed,
        }
    }
}

fn delete_selection(doc: &mut Document) -> Result<Inverse, CommandError> {
    if !doc.cursor.has_selection() {
        return Ok(Inverse::Nothing);
    }
    let (start, end) = doc.cursor.selection_bounds(&doc.tree);
    let selected = get_subtree(&doc.tree, start, end);
    // Math lists selected from their first leaf through their end slot.
    let covered: Vec<NodeId> = selected
        .iter()
        .filter(|&&leaf| doc.tree.kind(leaf) == Some(&NodeKind::Placeholder))
        .filter_map(|&slot| doc.tree.parent(slot))
        .filter(|&list| selected.contains(&doc.tree.first_leaf(list)))
        .collect();
    doc.cursor.set_node(start);

    let mut seq = Sequence::new();
    for _ in 0..selected.len() {
        let at = doc.cursor.get_node();
        // The end slot of a partly selected math list stays; step over it.
        let step = match doc.tree.kind(at) {
            Some(NodeKind::Placeholder)
                if !doc.tree.parent(at).is_some_and(|list| covered.contains(&list)) =>
            {
                Command::MoveCursor(1)
            }
            _ => Command::DeleteChar,
        };
        seq.step(doc, step)?;
    }
    Ok(seq.finish())
}

#[cfg(test)]
#[path = "../../tests/unit/document/command.rs"]
mod tests;

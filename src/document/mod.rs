//! The document: tree, cursor and history plus the projections derived from
//! them.
//!
//! All edits go through [`Document::run`]. After every command the layout,
//! the Markdown and plaintext exports and the link index are rebuilt from
//! scratch, then observers are notified once.

pub mod command;
pub mod history;
pub mod import;
pub mod layout;
pub mod links;
pub mod markdown;
pub mod metrics;
pub mod plaintext;

use std::time::SystemTime;

use crate::config::EditorConfig;
use crate::error::{CommandError, ImportError, TreeError};
use crate::models::symbols;
use crate::models::{
    Cursor, CursorState, LeafData, Link, NodeId, NodeIterator, NodeKind, NodePath, NodeTree,
};

pub use command::{AppliedCommand, Command};
pub use history::History;
pub use layout::{BoxId, BoxKind, Layout, LayoutBox, Layouter};
pub use metrics::{GlyphExtents, GlyphMetrics, MonospaceMetrics};

/// Where a deleted leaf used to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// An ordinary leaf at `index` under the container at `parent`.
    Leaf { parent: NodePath, index: usize },
    /// The end-of-line marker of line `line`; the lines were merged and the
    /// second one's content starts at child `at` of the merged line.
    LineBoundary { line: usize, at: usize },
    /// An empty math list at `index` under the line at `line`.
    MathList { line: NodePath, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedNode {
    pub data: LeafData,
    pub removal: Removal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    Updated {
        version: u64,
        can_undo: bool,
        can_redo: bool,
    },
}

type Observer = Box<dyn FnMut(&DocumentEvent)>;

pub struct Document {
    tree: NodeTree,
    cursor: Cursor,
    history: History,
    config: EditorConfig,
    metrics: Box<dyn GlyphMetrics>,
    title: String,
    last_modified: SystemTime,
    version: u64,
    implicit_x_position: Option<f32>,
    layout: Layout,
    markdown: String,
    plaintext: String,
    links: Vec<Link>,
    observers: Vec<Observer>,
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default(), Box::new(MonospaceMetrics::default()))
    }

    pub fn with_config(config: EditorConfig, metrics: Box<dyn GlyphMetrics>) -> Self {
        let tree = NodeTree::new();
        let cursor = Cursor::new(tree.first_leaf(tree.root()));
        let layout = Layouter::new(&config, metrics.as_ref()).layout(&tree);
        let mut doc = Self {
            tree,
            cursor,
            history: History::new(config.undo_grouping),
            config,
            metrics,
            title: String::new(),
            last_modified: SystemTime::now(),
            version: 0,
            implicit_x_position: None,
            layout,
            markdown: String::new(),
            plaintext: String::new(),
            links: Vec::new(),
            observers: Vec::new(),
        };
        doc.update();
        doc
    }

    // ==================== accessors ====================

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state(&self.tree)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.update();
    }

    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn implicit_x_position(&self) -> Option<f32> {
        self.implicit_x_position
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&DocumentEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ==================== commands ====================

    pub fn run(&mut self, command: Command) -> Result<(), CommandError> {
        tracing::debug!(command = command.name(), "run");
        let undoable = command.is_undoable();
        let updates_x = command.updates_implicit_x();

        let applied = AppliedCommand::run(command, self)?;
        if !undoable {
            self.history.clear();
        } else if applied.changes_tree() {
            self.history.push(applied);
        } else {
            self.history.break_coalescing();
        }

        self.update();
        if updates_x {
            self.update_implicit_x_position();
        }
        Ok(())
    }

    pub fn insert_text_at_cursor(&mut self, text: &str) -> Result<(), CommandError> {
        self.run(Command::InsertText(text.to_string()))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Reverts the most recent undo group. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(group) = self.history.pop_undo() else {
            return false;
        };
        tracing::debug!(commands = group.len(), "undo");
        for applied in group.iter().rev() {
            if let Err(err) = applied.undo(self) {
                self.discard_history(&err);
                return false;
            }
        }
        self.history.push_redo(group);
        self.update();
        self.update_implicit_x_position();
        true
    }

    /// Reapplies the most recently undone group. Returns `false` when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(group) = self.history.pop_redo() else {
            return false;
        };
        tracing::debug!(commands = group.len(), "redo");
        let mut redone = Vec::with_capacity(group.len());
        for applied in &group {
            match applied.redo(self) {
                Ok(applied) => redone.push(applied),
                Err(err) => {
                    self.discard_history(&err);
                    return false;
                }
            }
        }
        self.history.push_undo_group(redone);
        self.update();
        self.update_implicit_x_position();
        true
    }

    /// A history entry that no longer matches the tree is unusable, and so
    /// is everything recorded before it.
    fn discard_history(&mut self, err: &CommandError) {
        tracing::error!(error = %err, "history out of sync with the tree, discarding");
        self.history.clear();
        if self.cursor.state(&self.tree).resolve(&self.tree).is_none() {
            self.cursor = Cursor::new(self.tree.first_leaf(self.tree.root()));
        }
        self.update();
    }

    // ==================== projections ====================

    /// Rebuilds every projection from the tree and notifies observers.
    pub fn update(&mut self) {
        self.tree.clear_layout_boxes();
        let layout = Layouter::new(&self.config, self.metrics.as_ref())
            .with_cursor(self.cursor.get_node())
            .layout(&self.tree);
        let boxes: Vec<_> = layout.node_boxes().collect();
        for (node, layout_box) in boxes {
            self.tree.set_layout_box(node, Some(layout_box));
        }
        self.layout = layout;

        self.markdown = markdown::scan(&self.tree, &self.title);
        self.plaintext = plaintext::scan(&self.tree);
        self.links = links::collect(&self.tree);
        self.last_modified = SystemTime::now();
        self.version += 1;
        tracing::debug!(
            version = self.version,
            lines = self.tree.line_count(),
            display_lines = self.layout.display_lines().len(),
            "projections rebuilt"
        );

        let event = DocumentEvent::Updated {
            version: self.version,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    fn update_implicit_x_position(&mut self) {
        self.implicit_x_position = self.get_xy_at_node(self.cursor.get_node()).map(|(x, _)| x);
    }

    pub fn get_xy_at_node(&self, node: NodeId) -> Option<(f32, f32)> {
        let layout_box = self.tree.layout_box(node)?;
        Some(self.layout.xy_of(layout_box))
    }

    pub fn get_node_at_xy(&self, x: f32, y: f32) -> Option<NodeId> {
        self.layout
            .node_at_xy(x, y)
            .filter(|&node| self.tree.contains(node))
    }

    pub fn get_link_at_xy(&self, x: f32, y: f32) -> Option<&Link> {
        self.get_node_at_xy(x, y).and_then(|node| self.tree.link(node))
    }

    // ==================== primitives ====================
    //
    // Each primitive validates before it mutates and leaves the cursor on a
    // live leaf.

    pub(crate) fn insert_character(&mut self, c: char) -> Result<NodeId, TreeError> {
        self.insert_leaf(LeafData::plain(NodeKind::Char(c)))
    }

    pub(crate) fn insert_math_symbol(&mut self, name: &str) -> Result<NodeId, CommandError> {
        symbols::glyph_for_content(name)?;
        Ok(self.insert_leaf(LeafData::plain(NodeKind::MathSymbol(name.into())))?)
    }

    fn insert_leaf(&mut self, data: LeafData) -> Result<NodeId, TreeError> {
        let at = self.cursor.get_node();
        let parent = self.tree.parent(at).ok_or(TreeError::InvalidNodeId(at))?;
        let index = self.tree.get_index(parent, at)?;
        let leaf = self.tree.create_leaf(data);
        self.tree.insert(parent, index, leaf)?;
        self.cursor.set_node(at);
        Ok(leaf)
    }

    /// Splits the cursor's line before the cursor and returns the index of
    /// the first half. Inside a math list the split happens before the list.
    pub(crate) fn insert_linebreak(&mut self) -> Result<usize, TreeError> {
        let at = self.cursor.get_node();
        let line = self.tree.line_of(at).ok_or(TreeError::InvalidNodeId(at))?;
        let child = self
            .tree
            .line_child_of(at)
            .ok_or(TreeError::InvalidNodeId(at))?;
        let index = self.tree.get_index(self.tree.root(), line)?;
        let split_at = self.tree.get_index(line, child)?;
        self.split_line_at(index, split_at)?;
        Ok(index)
    }

    /// Replaces line `index` by its two halves, split before child `at`, and
    /// puts the cursor at the start of the second half.
    pub(crate) fn split_line_at(
        &mut self,
        index: usize,
        at: usize,
    ) -> Result<(NodeId, NodeId), TreeError> {
        let root = self.tree.root();
        let line = self
            .tree
            .get_child(root, index as isize)
            .ok_or_else(|| TreeError::InvalidPath(NodePath::new(vec![index])))?;
        let child = self
            .tree
            .get_child(line, at as isize)
            .ok_or_else(|| TreeError::InvalidPath(NodePath::new(vec![index, at])))?;

        let (first, second) = self.tree.split_line(line, child)?;
        self.tree.delete(line)?;
        self.tree.insert(root, index, first)?;
        self.tree.insert(root, index + 1, second)?;
        self.cursor.set_node(self.tree.first_leaf(second));
        Ok((first, second))
    }

    /// Replaces lines `index` and `index + 1` by their concatenation and puts
    /// the cursor at the seam. Returns the dropped end-of-line marker.
    pub(crate) fn merge_lines_at(&mut self, index: usize) -> Result<LeafData, TreeError> {
        let root = self.tree.root();
        let first = self
            .tree
            .get_child(root, index as isize)
            .ok_or_else(|| TreeError::InvalidPath(NodePath::new(vec![index])))?;
        let second = self
            .tree
            .get_child(root, index as isize + 1)
            .ok_or_else(|| TreeError::InvalidPath(NodePath::new(vec![index + 1])))?;
        let seam = self.tree.child_count(first).saturating_sub(1);

        let (merged, eol) = self.tree.merge_lines(first, second)?;
        self.tree.delete(first)?;
        self.tree.delete(second)?;
        self.tree.insert(root, index, merged)?;
        let boundary = self
            .tree
            .get_child(merged, seam as isize)
            .ok_or(TreeError::InvalidNodeId(merged))?;
        self.cursor.set_node(self.tree.first_leaf(boundary));
        Ok(eol)
    }

    /// Deletes the leaf at the cursor. At the end of a line the next line is
    /// merged in instead. On the end slot of an empty math list the list
    /// itself goes. At the end of the document, or on the end slot of a
    /// non-empty list, nothing happens and `None` is returned.
    pub(crate) fn delete_char_at_cursor(&mut self) -> Result<Option<DeletedNode>, TreeError> {
        let at = self.cursor.get_node();
        match self.tree.kind(at).cloned() {
            None => Err(TreeError::InvalidNodeId(at)),
            Some(NodeKind::Placeholder) => self.delete_empty_math_list(at),
            Some(NodeKind::Eol) => {
                let line = self.tree.line_of(at).ok_or(TreeError::InvalidNodeId(at))?;
                let index = self.tree.get_index(self.tree.root(), line)?;
                if index + 1 >= self.tree.line_count() {
                    return Ok(None);
                }
                let seam = self.tree.child_count(line).saturating_sub(1);
                let data = self.merge_lines_at(index)?;
                Ok(Some(DeletedNode {
                    data,
                    removal: Removal::LineBoundary {
                        line: index,
                        at: seam,
                    },
                }))
            }
            Some(_) => {
                let mut it = NodeIterator::new(&self.tree, at);
                if !it.next() {
                    return Ok(None);
                }
                let next = it.get_node();
                let parent = self.tree.parent(at).ok_or(TreeError::InvalidNodeId(at))?;
                let index = self.tree.get_index(parent, at)?;
                let data = self.tree.leaf_data(at).ok_or(TreeError::InvalidNodeId(at))?;
                let parent_path = self.tree.path_of(parent);

                self.tree.delete(at)?;
                self.cursor.set_node(next);
                Ok(Some(DeletedNode {
                    data,
                    removal: Removal::Leaf {
                        parent: parent_path,
                        index,
                    },
                }))
            }
        }
    }

    fn delete_empty_math_list(&mut self, slot: NodeId) -> Result<Option<DeletedNode>, TreeError> {
        let list = self.tree.parent(slot).ok_or(TreeError::InvalidNodeId(slot))?;
        if self.tree.child_count(list) > 1 {
            return Ok(None);
        }
        let line = self.tree.parent(list).ok_or(TreeError::InvalidNodeId(list))?;
        let index = self.tree.get_index(line, list)?;
        let next = self
            .tree
            .get_child(line, index as isize + 1)
            .ok_or(TreeError::InvalidNodeId(line))?;
        let line_path = self.tree.path_of(line);

        self.tree.delete(list)?;
        self.cursor.set_node(self.tree.first_leaf(next));
        Ok(Some(DeletedNode {
            data: LeafData::plain(NodeKind::MathList),
            removal: Removal::MathList {
                line: line_path,
                index,
            },
        }))
    }

    /// Leaf reached by walking `offset` leaves from `from`, and the signed
    /// distance actually walked.
    fn walk(&self, from: NodeId, offset: isize) -> (NodeId, isize) {
        let mut it = NodeIterator::new(&self.tree, from);
        let mut moved = 0isize;
        for _ in 0..offset.unsigned_abs() {
            let stepped = if offset > 0 { it.next() } else { it.prev() };
            if !stepped {
                break;
            }
            moved += 1;
        }
        (it.get_node(), moved * offset.signum())
    }

    /// Moves the cursor by `offset` leaves, collapsing the selection.
    /// Returns the distance actually moved.
    pub fn move_cursor_by_offset(&mut self, offset: isize) -> isize {
        let (node, moved) = self.walk(self.cursor.get_node(), offset);
        self.cursor.set_node(node);
        moved
    }

    pub fn extend_selection_by_offset(&mut self, offset: isize) -> isize {
        let (node, moved) = self.walk(self.cursor.get_node(), offset);
        self.cursor.set_insert(node);
        moved
    }

    pub fn move_cursor_to_line_start(&mut self) {
        if let Some(line) = self.tree.line_of(self.cursor.get_node()) {
            self.cursor.set_node(self.tree.first_leaf(line));
        }
    }

    pub fn move_cursor_to_line_end(&mut self) {
        if let Some(line) = self.tree.line_of(self.cursor.get_node()) {
            self.cursor.set_node(self.tree.last_leaf(line));
        }
    }

    pub fn select_all(&mut self) {
        let root = self.tree.root();
        self.cursor
            .set_selection(self.tree.first_leaf(root), self.tree.last_leaf(root));
    }

    pub fn move_cursor_to_xy(&mut self, x: f32, y: f32) {
        if let Some(node) = self.get_node_at_xy(x, y) {
            self.cursor.set_node(node);
        }
    }

    /// Moves `lines` display lines up (negative) or down, aiming for the
    /// remembered x position. Uses the layout of the last update.
    pub fn move_cursor_vertically(&mut self, lines: isize) {
        let Some(layout_box) = self.tree.layout_box(self.cursor.get_node()) else {
            return;
        };
        let Some(current) = self.layout.display_line_of(layout_box) else {
            return;
        };
        let display_lines = self.layout.display_lines();
        let last = display_lines.len().saturating_sub(1) as isize;
        let target = (current as isize).saturating_add(lines).clamp(0, last) as usize;
        let x = self
            .implicit_x_position
            .unwrap_or_else(|| self.layout.xy_of(layout_box).0);

        let node = display_lines
            .get(target)
            .and_then(|&line| self.layout.node_in_line_at_x(line, x))
            .filter(|&node| self.tree.contains(node));
        if let Some(node) = node {
            self.cursor.set_node(node);
        }
    }

    /// Replaces the tree with the note in `html`. The cursor goes to the
    /// start of the document.
    pub(crate) fn populate_from_html(&mut self, html: &str) -> Result<(), ImportError> {
        let imported = import::parse_html(html)?;
        if let Some(title) = imported.title {
            self.title = title;
        }
        self.tree = imported.tree;
        self.cursor = Cursor::new(self.tree.first_leaf(self.tree.root()));
        self.implicit_x_position = None;
        tracing::debug!(lines = self.tree.line_count(), "imported note");
        Ok(())
    }

    /// Puts the cursor back on a recorded position.
    pub fn restore_cursor(&mut self, state: &CursorState) -> Result<(), TreeError> {
        self.cursor = state
            .resolve(&self.tree)
            .ok_or_else(|| TreeError::InvalidPath(state.insert.clone()))?;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/document.rs"]
mod tests;

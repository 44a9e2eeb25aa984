//! Gap cursor and selection.
//!
//! The insert position always references a leaf and means "immediately
//! before this leaf". A selection is the ordered pair (anchor, insert).

use std::cmp::Ordering;

use super::iterator::NodeIterator;
use super::node::{NodeId, NodePath, NodeTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    anchor: NodeId,
    insert: NodeId,
}

impl Cursor {
    pub fn new(node: NodeId) -> Self {
        Self {
            anchor: node,
            insert: node,
        }
    }

    pub fn get_node(&self) -> NodeId {
        self.insert
    }

    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    /// Moves the insert position and collapses the selection.
    pub fn set_node(&mut self, node: NodeId) {
        self.anchor = node;
        self.insert = node;
    }

    /// Moves the insert position, keeping the anchor.
    pub fn set_insert(&mut self, node: NodeId) {
        self.insert = node;
    }

    pub fn set_selection(&mut self, anchor: NodeId, insert: NodeId) {
        self.anchor = anchor;
        self.insert = insert;
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.insert
    }

    /// Selection endpoints in document order.
    pub fn selection_bounds(&self, tree: &NodeTree) -> (NodeId, NodeId) {
        match tree.compare_order(self.anchor, self.insert) {
            Ordering::Greater => (self.insert, self.anchor),
            _ => (self.anchor, self.insert),
        }
    }

    pub fn state(&self, tree: &NodeTree) -> CursorState {
        CursorState {
            anchor: tree.path_of(self.anchor),
            insert: tree.path_of(self.insert),
        }
    }
}

/// Cursor expressed as structural paths, valid across node re-creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CursorState {
    pub anchor: NodePath,
    pub insert: NodePath,
}

impl CursorState {
    pub fn resolve(&self, tree: &NodeTree) -> Option<Cursor> {
        let anchor = tree.node_at_path(&self.anchor)?;
        let insert = tree.node_at_path(&self.insert)?;
        (tree.is_leaf(anchor) && tree.is_leaf(insert)).then_some(Cursor { anchor, insert })
    }
}

/// Leaves from `start` (inclusive) to `end` (exclusive) in document order,
/// regardless of how deeply either end is nested.
pub fn get_subtree(tree: &NodeTree, start: NodeId, end: NodeId) -> Vec<NodeId> {
    let (start, end) = match tree.compare_order(start, end) {
        Ordering::Greater => (end, start),
        _ => (start, end),
    };

    let mut leaves = Vec::new();
    let mut it = NodeIterator::new(tree, start);
    while it.get_node() != end {
        leaves.push(it.get_node());
        if !it.next() {
            break;
        }
    }
    leaves
}

#[cfg(test)]
#[path = "../../tests/unit/models/cursor.rs"]
mod tests;

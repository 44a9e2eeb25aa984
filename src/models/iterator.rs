//! Leaf-to-leaf traversal in document order.

use super::node::{NodeId, NodeTree};

pub struct NodeIterator<'a> {
    tree: &'a NodeTree,
    current: NodeId,
}

impl<'a> NodeIterator<'a> {
    pub fn new(tree: &'a NodeTree, node: NodeId) -> Self {
        Self {
            tree,
            current: node,
        }
    }

    pub fn get_node(&self) -> NodeId {
        self.current
    }

    /// Steps to the following leaf. Returns `false` at the end of the document.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let mut node = self.current;
        loop {
            let Some(parent) = self.tree.parent(node) else {
                return false;
            };
            let Some(index) = self.tree.index_in_parent(node) else {
                return false;
            };
            if let Some(&sibling) = self.tree.children(parent).get(index + 1) {
                self.current = self.tree.first_leaf(sibling);
                return true;
            }
            node = parent;
        }
    }

    /// Steps to the preceding leaf. Returns `false` at the start of the document.
    pub fn prev(&mut self) -> bool {
        let mut node = self.current;
        loop {
            let Some(parent) = self.tree.parent(node) else {
                return false;
            };
            match self.tree.index_in_parent(node) {
                Some(index) if index > 0 => {
                    let sibling = self.tree.children(parent)[index - 1];
                    self.current = self.tree.last_leaf(sibling);
                    return true;
                }
                Some(_) => node = parent,
                None => return false,
            }
        }
    }

    pub fn get_line(&self) -> Option<NodeId> {
        self.tree.line_of(self.current)
    }

    pub fn starts_line(&self) -> bool {
        self.get_line()
            .is_some_and(|line| self.tree.first_leaf(line) == self.current)
    }

    pub fn ends_line(&self) -> bool {
        self.get_line()
            .is_some_and(|line| self.tree.last_leaf(line) == self.current)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/iterator.rs"]
mod tests;

//! Rich-text node tree.
//!
//! Nodes live in a slot arena and are addressed by [`NodeId`]. Each node owns
//! its ordered child list and keeps a non-owning parent handle. The shape is
//! always `Root -> Line -> leaf` or `Root -> Line -> MathList -> leaf`; every
//! Line ends with an `Eol` leaf and every MathList ends with a `Placeholder`
//! leaf, so no container a cursor can reach is ever empty.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::link::Link;
use crate::document::layout::BoxId;
use crate::error::TreeError;

new_key_type! { pub struct NodeId; }

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Bold,
    Italic,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Bold => "bold",
            Tag::Italic => "italic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bold" => Some(Tag::Bold),
            "italic" => Some(Tag::Italic),
            _ => None,
        }
    }

    /// Markdown delimiter for this style.
    pub fn marker(self) -> &'static str {
        match self {
            Tag::Bold => "**",
            Tag::Italic => "*",
        }
    }
}

pub type TagSet = BTreeSet<Tag>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Line,
    MathList,
    Char(char),
    /// Macro name (`alpha`) or a single literal glyph.
    MathSymbol(CompactString),
    Eol,
    Placeholder,
}

impl NodeKind {
    pub fn is_leaf(&self) -> bool {
        !self.is_container()
    }

    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Line | NodeKind::MathList)
    }

    /// Leaves that only exist to keep a container addressable.
    pub fn is_structural(&self) -> bool {
        matches!(self, NodeKind::Eol | NodeKind::Placeholder)
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, NodeKind::Char(c) if c.is_whitespace())
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    tags: TagSet,
    link: Option<Link>,
    layout_box: Option<BoxId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            tags: TagSet::new(),
            link: None,
            layout_box: None,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn link(&self) -> Option<&Link> {
        self.link.as_ref()
    }

    pub fn layout_box(&self) -> Option<BoxId> {
        self.layout_box
    }
}

/// Everything needed to recreate a leaf after it was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafData {
    pub kind: NodeKind,
    pub tags: TagSet,
    pub link: Option<Link>,
}

impl LeafData {
    pub fn plain(kind: NodeKind) -> Self {
        Self {
            kind,
            tags: TagSet::new(),
            link: None,
        }
    }
}

/// Structural address of a node: child indices walked from the root.
///
/// Paths order the same way the nodes appear in the document, and they stay
/// meaningful when nodes are recreated with identical structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct NodeTree {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl NodeTree {
    /// A document with one empty line.
    pub fn new() -> Self {
        let mut tree = Self::with_root();
        let line = tree.create_line();
        tree.attach(tree.root, 0, line);
        tree
    }

    /// A bare root, for builders that append their own lines.
    pub(crate) fn with_root() -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node::new(NodeKind::Root));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.arena.get(id).map(|n| &n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.kind(id).is_some_and(NodeKind::is_leaf)
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    pub fn line_count(&self) -> usize {
        self.child_count(self.root)
    }

    // ==================== attributes ====================

    pub fn tags(&self, id: NodeId) -> Option<&TagSet> {
        self.arena.get(id).map(|n| &n.tags)
    }

    pub fn has_tag(&self, id: NodeId, tag: Tag) -> bool {
        self.tags(id).is_some_and(|tags| tags.contains(&tag))
    }

    pub fn add_tag(&mut self, id: NodeId, tag: Tag) -> bool {
        self.arena
            .get_mut(id)
            .map(|n| n.tags.insert(tag))
            .unwrap_or(false)
    }

    pub fn remove_tag(&mut self, id: NodeId, tag: Tag) -> bool {
        self.arena
            .get_mut(id)
            .map(|n| n.tags.remove(&tag))
            .unwrap_or(false)
    }

    pub fn link(&self, id: NodeId) -> Option<&Link> {
        self.arena.get(id).and_then(|n| n.link.as_ref())
    }

    /// Replaces the link of `id`, returning the previous one.
    pub fn set_link(&mut self, id: NodeId, link: Option<Link>) -> Option<Link> {
        self.arena
            .get_mut(id)
            .and_then(|n| std::mem::replace(&mut n.link, link))
    }

    pub fn layout_box(&self, id: NodeId) -> Option<BoxId> {
        self.arena.get(id).and_then(|n| n.layout_box)
    }

    pub(crate) fn set_layout_box(&mut self, id: NodeId, layout_box: Option<BoxId>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.layout_box = layout_box;
        }
    }

    pub(crate) fn clear_layout_boxes(&mut self) {
        for (_, node) in self.arena.iter_mut() {
            node.layout_box = None;
        }
    }

    pub fn leaf_data(&self, id: NodeId) -> Option<LeafData> {
        let node = self.arena.get(id)?;
        node.kind.is_leaf().then(|| LeafData {
            kind: node.kind.clone(),
            tags: node.tags.clone(),
            link: node.link.clone(),
        })
    }

    // ==================== creation ====================

    /// Creates a detached node. Lines and math lists come with their end slot.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        match kind {
            NodeKind::Line => self.create_line(),
            NodeKind::MathList => self.create_math_list(),
            kind => self.arena.insert(Node::new(kind)),
        }
    }

    pub fn create_leaf(&mut self, data: LeafData) -> NodeId {
        let mut node = Node::new(data.kind);
        node.tags = data.tags;
        node.link = data.link;
        self.arena.insert(node)
    }

    pub fn create_line(&mut self) -> NodeId {
        let line = self.arena.insert(Node::new(NodeKind::Line));
        let eol = self.arena.insert(Node::new(NodeKind::Eol));
        self.attach(line, 0, eol);
        line
    }

    pub fn create_math_list(&mut self) -> NodeId {
        let list = self.arena.insert(Node::new(NodeKind::MathList));
        let slot = self.arena.insert(Node::new(NodeKind::Placeholder));
        self.attach(list, 0, slot);
        list
    }

    fn empty_line(&mut self) -> NodeId {
        self.arena.insert(Node::new(NodeKind::Line))
    }

    // ==================== structure ====================

    pub fn get_child(&self, parent: NodeId, index: isize) -> Option<NodeId> {
        let children = self.children(parent);
        let index = if index < 0 {
            children.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        children.get(index).copied()
    }

    pub fn get_index(&self, parent: NodeId, child: NodeId) -> Result<usize, TreeError> {
        self.children(parent)
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::NotFound { parent, child })
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), TreeError> {
        let parent_node = self
            .arena
            .get(parent)
            .ok_or(TreeError::InvalidNodeId(parent))?;
        if !parent_node.kind.is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        let child_node = self.arena.get(child).ok_or(TreeError::InvalidNodeId(child))?;
        if child == self.root || child_node.parent.is_some() {
            return Err(TreeError::InvalidNodeId(child));
        }
        let index = index.min(parent_node.children.len());
        self.attach(parent, index, child);
        Ok(())
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let index = self.child_count(parent);
        self.insert(parent, index, child)
    }

    /// Detaches `child` from `parent`, returning the index it occupied.
    /// The node stays allocated until [`NodeTree::delete`] frees it.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<usize, TreeError> {
        if child == self.root {
            return Err(TreeError::RootRemoval);
        }
        let index = self.get_index(parent, child)?;
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.remove(index);
        }
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = None;
        }
        Ok(index)
    }

    /// Frees `id` and everything below it, detaching it first if needed.
    pub fn delete(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::RootRemoval);
        }
        if let Some(parent) = self.parent(id) {
            self.remove(parent, id)?;
        }
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            if let Some(node) = self.arena.remove(node_id) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.insert(index, child);
        }
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = self
            .arena
            .get_mut(id)
            .map(|n| std::mem::take(&mut n.children))
            .unwrap_or_default();
        for &child in &children {
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = None;
            }
        }
        children
    }

    fn adopt(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for child in children {
            let index = self.child_count(parent);
            self.attach(parent, index, child);
        }
    }

    /// Splits `line` immediately before its direct child `at`.
    ///
    /// Returns two new detached lines: the first holds the children before
    /// `at` plus a fresh end-of-line marker, the second holds `at` and
    /// everything after it. `line` is left empty for the caller to discard.
    pub fn split_line(&mut self, line: NodeId, at: NodeId) -> Result<(NodeId, NodeId), TreeError> {
        if self.kind(line) != Some(&NodeKind::Line) {
            return Err(TreeError::NotALine(line));
        }
        let index = self.get_index(line, at)?;

        let mut first_children = self.take_children(line);
        let second_children = first_children.split_off(index);

        let first = self.empty_line();
        self.adopt(first, first_children);
        let eol = self.arena.insert(Node::new(NodeKind::Eol));
        self.adopt(first, vec![eol]);

        let second = self.empty_line();
        self.adopt(second, second_children);
        Ok((first, second))
    }

    /// Joins two lines into a new detached line, dropping the first line's
    /// end-of-line marker. Returns the new line and the dropped marker's data.
    /// Both input lines are left empty for the caller to discard.
    pub fn merge_lines(
        &mut self,
        first: NodeId,
        second: NodeId,
    ) -> Result<(NodeId, LeafData), TreeError> {
        for line in [first, second] {
            if self.kind(line) != Some(&NodeKind::Line) {
                return Err(TreeError::NotALine(line));
            }
        }
        let eol = self
            .get_child(first, -1)
            .ok_or(TreeError::InvalidNodeId(first))?;
        let data = self.leaf_data(eol).ok_or(TreeError::InvalidNodeId(eol))?;

        self.delete(eol)?;
        let mut children = self.take_children(first);
        children.extend(self.take_children(second));

        let merged = self.empty_line();
        self.adopt(merged, children);
        Ok((merged, data))
    }

    // ==================== traversal ====================

    /// Pre-order, left to right, starting with `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = if self.contains(id) { vec![id] } else { Vec::new() };
        Descendants { tree: self, stack }
    }

    /// All leaves of the document in order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(self.root).filter(|&id| self.is_leaf(id))
    }

    pub fn first_leaf(&self, id: NodeId) -> NodeId {
        let mut node = id;
        while let Some(&child) = self.children(node).first() {
            node = child;
        }
        node
    }

    pub fn last_leaf(&self, id: NodeId) -> NodeId {
        let mut node = id;
        while let Some(&child) = self.children(node).last() {
            node = child;
        }
        node
    }

    /// The Line containing `id` (the ancestor whose parent is the root).
    pub fn line_of(&self, id: NodeId) -> Option<NodeId> {
        let mut node = id;
        loop {
            let parent = self.parent(node)?;
            if parent == self.root {
                return Some(node);
            }
            node = parent;
        }
    }

    /// The direct child of `line` that contains `id`.
    pub fn line_child_of(&self, id: NodeId) -> Option<NodeId> {
        let line = self.line_of(id)?;
        let mut node = id;
        while self.parent(node)? != line {
            node = self.parent(node)?;
        }
        Some(node)
    }

    /// Leaves inside a MathList and math symbols are typeset as math.
    pub fn is_math(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::MathSymbol(_)))
            || self
                .parent(id)
                .is_some_and(|p| self.kind(p) == Some(&NodeKind::MathList))
    }

    pub fn path_of(&self, id: NodeId) -> NodePath {
        let mut indices = Vec::new();
        let mut node = id;
        while let Some(parent) = self.parent(node) {
            indices.push(self.index_in_parent(node).unwrap_or(0));
            node = parent;
        }
        indices.reverse();
        NodePath(indices)
    }

    pub fn node_at_path(&self, path: &NodePath) -> Option<NodeId> {
        path.0
            .iter()
            .try_fold(self.root, |node, &index| self.children(node).get(index).copied())
    }

    /// Orders two nodes as they appear in the document.
    pub fn compare_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        self.path_of(a).cmp(&self.path_of(b))
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Descendants<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/node.rs"]
mod tests;

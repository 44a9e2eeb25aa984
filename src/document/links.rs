//! Link index: the distinct links referenced anywhere in the tree.

use rustc_hash::FxHashSet;

use crate::models::{Link, NodeTree};

/// Distinct links in order of first appearance.
pub fn collect(tree: &NodeTree) -> Vec<Link> {
    let mut seen = FxHashSet::default();
    tree.descendants(tree.root())
        .filter_map(|id| tree.link(id))
        .filter(|link| seen.insert(*link))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/document/links.rs"]
mod tests;

//! Tree -> plain text projection: the Markdown traversal without markup.

use crate::models::symbols;
use crate::models::{NodeKind, NodeTree};

pub fn scan(tree: &NodeTree) -> String {
    let mut out = String::new();
    let last = tree.last_leaf(tree.root());
    for leaf in tree.leaves() {
        match tree.kind(leaf) {
            Some(NodeKind::Char(c)) => out.push(*c),
            Some(NodeKind::MathSymbol(content)) => match symbols::glyph_for_content(content) {
                Ok(glyph) => out.push(glyph),
                Err(_) => out.push_str(content),
            },
            Some(NodeKind::Eol) if leaf != last => out.push('\n'),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/document/plaintext.rs"]
mod tests;

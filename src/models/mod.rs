//! Data model layer: node tree, traversal, cursor, links and the symbol table.

pub mod cursor;
pub mod iterator;
pub mod link;
pub mod node;
pub mod symbols;

pub use cursor::{get_subtree, Cursor, CursorState};
pub use iterator::NodeIterator;
pub use link::Link;
pub use node::{Descendants, LeafData, Node, NodeId, NodeKind, NodePath, NodeTree, Tag, TagSet};
pub use symbols::SymbolClass;

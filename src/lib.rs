//! lemma - document engine for a rich-text note editor.
//!
//! Modules:
//! - models: node tree, iterator, cursor, links, math symbol table
//! - document: commands, undo history, word-wrap layout, exports, HTML import
//! - config: editor configuration (JSON)
//! - error: error kinds

pub mod config;
pub mod document;
pub mod error;
pub mod models;

pub use config::{EditorConfig, UndoGrouping};
pub use document::{Command, Document, DocumentEvent};
pub use error::{CommandError, ConfigError, ImportError, SymbolError, TreeError};

//! Error kinds for the tree, the symbol table, commands, import and config loading.

use compact_str::CompactString;
use std::path::PathBuf;

use crate::models::{NodeId, NodePath};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("node {child:?} is not a child of {parent:?}")]
    NotFound { parent: NodeId, child: NodeId },
    #[error("invalid node id {0:?}")]
    InvalidNodeId(NodeId),
    #[error("node {0:?} cannot hold children")]
    NotAContainer(NodeId),
    #[error("node {0:?} is not a line")]
    NotALine(NodeId),
    #[error("the root node cannot be detached")]
    RootRemoval,
    #[error("no node at path {0:?}")]
    InvalidPath(NodePath),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(CompactString),
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("malformed markup at byte {position}: {message}")]
    Markup { position: usize, message: String },
}

/// Failure of a single command run, undo or redo.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

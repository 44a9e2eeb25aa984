//! Editor configuration: layout constants and the undo grouping policy.
//!
//! Stored as JSON; missing fields fall back to their defaults so older files
//! keep loading after new options are added.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_MAX_LINE_WIDTH: f32 = 670.0;
pub const DEFAULT_CARET_HEIGHT: f32 = 26.0;
pub const DEFAULT_CARET_TOP: f32 = 7.0;

const CONFIG_DIR: &str = ".lemma";
const CONFIG_FILE: &str = "config.json";

/// How consecutive edits are folded into undo groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndoGrouping {
    /// Adjacent non-whitespace characters typed in a row undo together.
    #[default]
    Word,
    /// Every edit is undone on its own.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_line_width: f32,
    pub caret_height: f32,
    pub caret_top: f32,
    pub min_line_height: f32,
    pub undo_grouping: UndoGrouping,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_line_width: DEFAULT_MAX_LINE_WIDTH,
            caret_height: DEFAULT_CARET_HEIGHT,
            caret_top: DEFAULT_CARET_TOP,
            min_line_height: DEFAULT_CARET_HEIGHT,
            undo_grouping: UndoGrouping::Word,
        }
    }
}

impl EditorConfig {
    pub fn with_max_line_width(mut self, width: f32) -> Self {
        self.max_line_width = width;
        self
    }

    pub fn with_undo_grouping(mut self, grouping: UndoGrouping) -> Self {
        self.undo_grouping = grouping;
        self
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join(CONFIG_DIR).join(CONFIG_FILE))
}

pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the default configuration to `path` unless a file is already there.
pub fn ensure_config_file(path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&EditorConfig::default())
            .unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, content).map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

// src/errors.rs

//! Crate-wide error types.
//!
//! Fail-fast kinds (`PluginNotFound`, `PluginUnreadable`, `ConnectionFailed`)
//! end a run before any screen is resolved. `ScreenExecution` is never
//! returned from a run: the orchestrator renders it into the screen content
//! and the log instead. `AccessorError` is separate: it only comes out of
//! direct table lookups and never ends a run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Plugin '{0}' not found")]
    PluginNotFound(String),

    #[error("Could not read plugin '{name}': {reason}")]
    PluginUnreadable { name: String, reason: String },

    #[error("Connection to {target} failed: {reason}")]
    ConnectionFailed { target: String, reason: String },

    #[error("screen {screen} failed: {reason}")]
    ScreenExecution { screen: usize, reason: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Misuse of the table accessor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessorError {
    #[error("screens have not been loaded; resolve a plugin first")]
    NotLoaded,

    #[error("screen index {index} out of range ({len} screens)")]
    ScreenOutOfRange { index: usize, len: usize },

    #[error("screen {0} is not a table")]
    NotATable(usize),

    #[error("row index {row} out of range ({rows} data rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("column index {column} out of range ({columns} cells)")]
    ColumnOutOfRange { column: usize, columns: usize },
}

pub type Result<T> = std::result::Result<T, ScreenrunError>;

// src/engine/mod.rs

//! Plugin run engine.
//!
//! - [`orchestrator`] resolves a parsed document through an execution
//!   channel, in batch or streaming form.
//! - [`log_sink`] carries the human-readable run log.
//! - [`service`] is the invocation surface: plugin lookup, channel
//!   construction, snapshots and the wire shapes handed to callers.

pub mod log_sink;
pub mod orchestrator;
pub mod service;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::errors::{Result, ScreenrunError};
use crate::plugin::PluginDocument;

pub use log_sink::{LogEntry, LogKind, LogSink};
pub use orchestrator::{ERROR_MARKER, drive, resolve, resolve_streaming};
pub use service::{PluginRequest, PluginService, StreamMessage, stream_messages};

/// Events produced by a run, in order.
#[derive(Debug)]
pub enum RunEvent {
    Log(LogEntry),
    /// Last event of every run.
    Finished(Result<PluginDocument>),
}

/// Result of a batch run.
///
/// There is no partial success: either every screen was processed (possibly
/// with per-screen errors recorded inline) or the run failed before any
/// screen and no document exists.
#[derive(Debug)]
pub enum RunOutcome {
    Completed {
        document: PluginDocument,
        logs: Vec<LogEntry>,
    },
    Failed {
        error: ScreenrunError,
        logs: Vec<LogEntry>,
    },
}

impl RunOutcome {
    pub fn from_result(result: Result<PluginDocument>, logs: Vec<LogEntry>) -> Self {
        match result {
            Ok(document) => RunOutcome::Completed { document, logs },
            Err(error) => RunOutcome::Failed { error, logs },
        }
    }

    pub fn logs(&self) -> &[LogEntry] {
        match self {
            RunOutcome::Completed { logs, .. } | RunOutcome::Failed { logs, .. } => logs,
        }
    }

    pub fn document(&self) -> Option<&PluginDocument> {
        match self {
            RunOutcome::Completed { document, .. } => Some(document),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ScreenrunError> {
        match self {
            RunOutcome::Completed { .. } => None,
            RunOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<(PluginDocument, Vec<LogEntry>)> {
        match self {
            RunOutcome::Completed { document, logs } => Ok((document, logs)),
            RunOutcome::Failed { error, .. } => Err(error),
        }
    }
}

/// `{"screens": [...], "logs": [...]}` or `{"error": "..."}`.
impl Serialize for RunOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RunOutcome::Completed { document, logs } => {
                let mut state = serializer.serialize_struct("RunOutcome", 2)?;
                state.serialize_field("screens", document)?;
                state.serialize_field("logs", logs)?;
                state.end()
            }
            RunOutcome::Failed { error, .. } => {
                let mut state = serializer.serialize_struct("RunOutcome", 1)?;
                state.serialize_field("error", &error.to_string())?;
                state.end()
            }
        }
    }
}

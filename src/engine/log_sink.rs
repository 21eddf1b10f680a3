// src/engine/log_sink.rs

//! Run-scoped progress log.
//!
//! Entries are pushed into the run's event channel as they are produced.
//! A batch caller drains the channel into a list; a streaming caller
//! forwards each entry as it arrives.

use std::fmt;

use serde::{Serialize, Serializer};
use tokio::sync::mpsc;
use tracing::trace;

use crate::types::{OutputLine, OutputStream};

use super::RunEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Banners and per-screen progress.
    Info,
    Stdout,
    Stderr,
    /// Connection failures and failed screens.
    Error,
}

/// One human-readable line of a run's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: LogKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: LogKind::Error,
            message: message.into(),
        }
    }

    pub fn output(line: &OutputLine) -> Self {
        let kind = match line.stream {
            OutputStream::Stdout => LogKind::Stdout,
            OutputStream::Stderr => LogKind::Stderr,
        };
        Self {
            kind,
            message: line.text.clone(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LogKind::Info => f.write_str(&self.message),
            LogKind::Stdout => write!(f, "[stdout] {}", self.message),
            LogKind::Stderr => write!(f, "[stderr] {}", self.message),
            LogKind::Error => write!(f, "[error] {}", self.message),
        }
    }
}

impl Serialize for LogEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Push side of a run's event channel.
#[derive(Debug, Clone)]
pub struct LogSink {
    tx: mpsc::Sender<RunEvent>,
}

impl LogSink {
    pub fn new(tx: mpsc::Sender<RunEvent>) -> Self {
        Self { tx }
    }

    /// Append an entry. A consumer that went away is not an error; the run
    /// keeps going and the entry is dropped.
    pub async fn push(&self, entry: LogEntry) {
        if self.tx.send(RunEvent::Log(entry)).await.is_err() {
            trace!("log consumer dropped; entry discarded");
        }
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.push(LogEntry::info(message)).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.push(LogEntry::error(message)).await;
    }
}

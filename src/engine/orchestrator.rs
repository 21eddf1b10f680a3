// src/engine/orchestrator.rs

//! Drives one parsed plugin through an execution channel.
//!
//! [`drive`] is the single implementation: it pushes log entries into a
//! [`LogSink`] as it goes and returns the resolved document. The public
//! entry points only differ in how they consume those entries:
//!
//! - [`resolve`] collects them into a list and returns once the run is over.
//! - [`resolve_streaming`] hands them out one by one as a stream, ending with
//!   [`RunEvent::Finished`].
//!
//! Screens run strictly in document order over one channel session.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::errors::{Result, ScreenrunError};
use crate::exec::{ExecutionChannel, LINE_BUFFER, ScriptOutcome};
use crate::plugin::PluginDocument;
use crate::types::OutputLine;

use super::log_sink::{LogEntry, LogSink};
use super::{RunEvent, RunOutcome};

/// Capacity of the run event channel.
pub const EVENT_BUFFER: usize = 64;

/// Prefix marking error lines in screen content.
pub const ERROR_MARKER: &str = "ERROR: ";

/// Resolve `document` and return it with the full log.
pub async fn resolve<C>(document: PluginDocument, channel: &mut C) -> RunOutcome
where
    C: ExecutionChannel + ?Sized,
{
    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);

    let producer = async move {
        let sink = LogSink::new(tx);
        drive(document, channel, &sink).await
    };

    let collector = async move {
        let mut logs = Vec::new();
        while let Some(event) = rx.recv().await {
            if let RunEvent::Log(entry) = event {
                logs.push(entry);
            }
        }
        logs
    };

    let (result, logs) = tokio::join!(producer, collector);
    RunOutcome::from_result(result, logs)
}

/// Resolve `document` on a background task, streaming log entries as they
/// are produced.
///
/// The stream always ends with exactly one [`RunEvent::Finished`]. Dropping
/// the stream does not stop the run; poison the channel for that.
pub fn resolve_streaming<C>(document: PluginDocument, mut channel: C) -> ReceiverStream<RunEvent>
where
    C: ExecutionChannel + 'static,
{
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    tokio::spawn(async move {
        let sink = LogSink::new(tx.clone());
        let result = drive(document, &mut channel, &sink).await;
        drop(sink);
        if tx.send(RunEvent::Finished(result)).await.is_err() {
            debug!("stream consumer dropped before run finished");
        }
    });

    ReceiverStream::new(rx)
}

/// Run every screen that has command blocks and substitute its output.
///
/// Fails only when the channel cannot be opened; screen failures are
/// written into the screen and the log. The channel is closed exactly once
/// after the last screen when it was opened.
pub async fn drive<C>(
    mut document: PluginDocument,
    channel: &mut C,
    sink: &LogSink,
) -> Result<PluginDocument>
where
    C: ExecutionChannel + ?Sized,
{
    let location = channel.describe();
    sink.info(format!("=== Running plugin on {location} ===")).await;

    let pending = document.pending_screens();
    if pending.is_empty() {
        sink.info("No commands to execute.").await;
        return Ok(document);
    }

    if let Err(err) = channel.open().await {
        warn!(%location, error = %err, "could not open execution channel");
        sink.error(err.to_string()).await;
        channel.close().await;
        return Err(err);
    }

    info!(%location, screens = pending.len(), "executing plugin screens");

    for index in pending {
        resolve_screen(&mut document, index, channel, sink).await;
    }

    channel.close().await;
    sink.info("=== Plugin run finished ===").await;

    Ok(document)
}

async fn resolve_screen<C>(document: &mut PluginDocument, index: usize, channel: &mut C, sink: &LogSink)
where
    C: ExecutionChannel + ?Sized,
{
    let Some(screen) = document.screen(index) else {
        return;
    };
    let script = screen.combined_script();
    let number = index + 1;

    sink.info(format!(
        "--- Screen {number} ({}): running {} command block(s) ---",
        display_name(&screen.name),
        screen.command_blocks().len()
    ))
    .await;

    let (line_tx, mut line_rx) = mpsc::channel::<OutputLine>(LINE_BUFFER);

    let collect = async {
        let mut output = Vec::new();
        while let Some(line) = line_rx.recv().await {
            sink.push(LogEntry::output(&line)).await;
            if let Some(text) = content_line(&line) {
                output.push(text);
            }
        }
        output
    };

    let (outcome, mut output) = tokio::join!(channel.run(&script, line_tx), collect);

    let failure = match outcome {
        Ok(ScriptOutcome::Success) => None,
        Ok(ScriptOutcome::Failed(code)) => Some(format!("script exited with status {code}")),
        Err(err) => Some(err.to_string()),
    };

    if let Some(reason) = failure {
        let err = ScreenrunError::ScreenExecution {
            screen: number,
            reason,
        };
        warn!(screen = number, error = %err, "screen execution failed");
        output.push(format!("{ERROR_MARKER}{err}"));
        sink.error(err.to_string()).await;
    }

    if let Some(screen) = document.screen_mut(index) {
        screen.resolve(output);
    }

    sink.info(format!("--- Screen {number} finished ---")).await;
}

/// Stdout lines are trimmed and blank ones dropped; stderr lines are marked.
fn content_line(line: &OutputLine) -> Option<String> {
    let text = line.text.trim();
    if text.is_empty() {
        return None;
    }
    Some(if line.is_stderr() {
        format!("{ERROR_MARKER}{text}")
    } else {
        text.to_string()
    })
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "unnamed" } else { name }
}

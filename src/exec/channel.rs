// src/exec/channel.rs

//! Pluggable execution channel abstraction.
//!
//! The orchestrator talks to an `ExecutionChannel` instead of a concrete
//! process or SSH session. One channel instance belongs to one run:
//!
//! - [`open`](ExecutionChannel::open) is called once, before the first screen
//!   that has commands. A failure here aborts the run.
//! - [`run`](ExecutionChannel::run) is called once per screen with the
//!   screen's combined script. Output lines are pushed into `lines` as they
//!   are produced; the sender is dropped when the script is done.
//! - [`close`](ExecutionChannel::close) is called exactly once after the last
//!   screen, whatever happened to the screens.
//!
//! Production code uses [`LocalChannel`](super::LocalChannel) or
//! [`RemoteChannel`](super::RemoteChannel); tests can provide a scripted fake.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::errors::Result;
use crate::types::OutputLine;

/// Buffer size of the per-screen line channel.
pub const LINE_BUFFER: usize = 256;

/// How a script ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Success,
    /// Non-zero exit status; `-1` when no status was available.
    Failed(i32),
}

impl ScriptOutcome {
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            ScriptOutcome::Success
        } else {
            ScriptOutcome::Failed(code)
        }
    }

    pub fn is_success(self) -> bool {
        self == ScriptOutcome::Success
    }
}

pub type ChannelFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

pub trait ExecutionChannel: Send {
    /// Short human-readable description of where scripts run
    /// (`"local shell"`, `"admin@10.0.0.5:22"`).
    fn describe(&self) -> String;

    /// Establish whatever session the channel needs.
    fn open(&mut self) -> ChannelFuture<'_, ()>;

    /// Run one script body, streaming tagged output lines into `lines`.
    ///
    /// A script that runs but fails is reported as `Ok(ScriptOutcome::Failed)`.
    /// `Err` is reserved for the channel itself breaking (lost session,
    /// poisoned channel, ...).
    fn run<'a>(
        &'a mut self,
        script: &'a str,
        lines: mpsc::Sender<OutputLine>,
    ) -> ChannelFuture<'a, ScriptOutcome>;

    /// Release the session. Must be safe to call when `open` was never
    /// called or failed.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

impl<C: ExecutionChannel + ?Sized> ExecutionChannel for Box<C> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn open(&mut self) -> ChannelFuture<'_, ()> {
        (**self).open()
    }

    fn run<'a>(
        &'a mut self,
        script: &'a str,
        lines: mpsc::Sender<OutputLine>,
    ) -> ChannelFuture<'a, ScriptOutcome> {
        (**self).run(script, lines)
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        (**self).close()
    }
}

/// Run `script` and collect all of its output before returning.
///
/// Buffered counterpart to [`ExecutionChannel::run`] for callers that do not
/// stream.
pub async fn run_collect<C: ExecutionChannel + ?Sized>(
    channel: &mut C,
    script: &str,
) -> Result<(Vec<OutputLine>, ScriptOutcome)> {
    let (tx, mut rx) = mpsc::channel(LINE_BUFFER);

    let collect = async move {
        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        lines
    };

    let (outcome, lines) = tokio::join!(channel.run(script, tx), collect);
    Ok((lines, outcome?))
}

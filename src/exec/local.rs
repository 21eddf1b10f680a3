// src/exec/local.rs

//! Local execution channel: runs scripts through the platform shell.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::types::{OutputLine, OutputStream};

use super::channel::{ChannelFuture, ExecutionChannel, ScriptOutcome};

/// Runs each script in a fresh `sh -c` (`cmd /C` on Windows).
///
/// There is no session, so `open`/`close` are no-ops. Failures to spawn or
/// read the child are reported as a stderr line plus `Failed(-1)` so the run
/// moves on to the next screen.
#[derive(Debug, Clone, Default)]
pub struct LocalChannel;

impl LocalChannel {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionChannel for LocalChannel {
    fn describe(&self) -> String {
        "local shell".to_string()
    }

    fn open(&mut self) -> ChannelFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn run<'a>(
        &'a mut self,
        script: &'a str,
        lines: mpsc::Sender<OutputLine>,
    ) -> ChannelFuture<'a, ScriptOutcome> {
        Box::pin(async move { Ok(run_local_script(script, lines).await) })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}

async fn run_local_script(script: &str, lines: mpsc::Sender<OutputLine>) -> ScriptOutcome {
    match run_local_inner(script, &lines).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "local script execution error");
            let _ = lines
                .send(OutputLine::stderr(format!("local execution failed: {err:#}")))
                .await;
            ScriptOutcome::Failed(-1)
        }
    }
}

async fn run_local_inner(script: &str, lines: &mpsc::Sender<OutputLine>) -> Result<ScriptOutcome> {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(script);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(script);
        c
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().context("spawning local shell")?;
    debug!(pid = ?child.id(), "local script started");

    let stdout = child.stdout.take().context("child stdout was not piped")?;
    let stderr = child.stderr.take().context("child stderr was not piped")?;
    let mut out_lines = BufReader::new(stdout).split(b'\n');
    let mut err_lines = BufReader::new(stderr).split(b'\n');

    let mut out_open = true;
    let mut err_open = true;

    // Both pipes are read concurrently so neither can fill up and stall the
    // child; interleaving between them is best-effort.
    while out_open || err_open {
        let (stream, next) = tokio::select! {
            next = out_lines.next_segment(), if out_open => (OutputStream::Stdout, next),
            next = err_lines.next_segment(), if err_open => (OutputStream::Stderr, next),
        };

        match next.with_context(|| format!("reading local {stream}"))? {
            Some(raw) => {
                if lines.send(OutputLine::from_raw(stream, &raw)).await.is_err() {
                    debug!("output receiver dropped; discarding local output");
                }
            }
            None => match stream {
                OutputStream::Stdout => out_open = false,
                OutputStream::Stderr => err_open = false,
            },
        }
    }

    let status = child.wait().await.context("waiting for local shell")?;
    let code = status.code().unwrap_or(-1);

    info!(exit_code = code, success = status.success(), "local script exited");

    Ok(if status.success() {
        ScriptOutcome::Success
    } else {
        ScriptOutcome::Failed(code)
    })
}

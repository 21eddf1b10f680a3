use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use screenrun::errors::ScreenrunError;
use screenrun::exec::{ChannelFuture, ExecutionChannel, ScriptOutcome};
use screenrun::types::OutputLine;

/// What the fake does for one `run` call.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Output {
        lines: Vec<OutputLine>,
        outcome: ScriptOutcome,
    },
    /// The channel itself breaks during this run.
    Broken(String),
}

/// Everything the fake observed.
#[derive(Debug, Default, Clone)]
pub struct FakeRecord {
    pub opens: usize,
    pub closes: usize,
    pub scripts: Vec<String>,
}

/// A scripted execution channel that:
/// - answers each `run` with the next queued [`FakeResponse`]
///   (a successful run with no output once the queue is empty)
/// - records opens, closes and every script it was given.
pub struct FakeChannel {
    responses: VecDeque<FakeResponse>,
    open_failure: Option<String>,
    record: Arc<Mutex<FakeRecord>>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            open_failure: None,
            record: Arc::new(Mutex::new(FakeRecord::default())),
        }
    }

    /// Shared handle to what the channel observed; stays valid after the
    /// channel is moved into a streaming run.
    pub fn record(&self) -> Arc<Mutex<FakeRecord>> {
        Arc::clone(&self.record)
    }

    pub fn respond(mut self, response: FakeResponse) -> Self {
        self.responses.push_back(response);
        self
    }

    pub fn respond_stdout(self, lines: &[&str]) -> Self {
        self.respond(FakeResponse::Output {
            lines: lines.iter().map(|l| OutputLine::stdout(*l)).collect(),
            outcome: ScriptOutcome::Success,
        })
    }

    pub fn respond_lines(self, lines: Vec<OutputLine>, outcome: ScriptOutcome) -> Self {
        self.respond(FakeResponse::Output { lines, outcome })
    }

    pub fn respond_broken(self, reason: &str) -> Self {
        self.respond(FakeResponse::Broken(reason.to_string()))
    }

    /// Make `open` fail like an unreachable host.
    pub fn failing_open(mut self, reason: &str) -> Self {
        self.open_failure = Some(reason.to_string());
        self
    }
}

impl Default for FakeChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionChannel for FakeChannel {
    fn describe(&self) -> String {
        "fake channel".to_string()
    }

    fn open(&mut self) -> ChannelFuture<'_, ()> {
        self.record.lock().unwrap().opens += 1;
        let failure = self.open_failure.clone();

        Box::pin(async move {
            match failure {
                Some(reason) => Err(ScreenrunError::ConnectionFailed {
                    target: "fake".to_string(),
                    reason,
                }),
                None => Ok(()),
            }
        })
    }

    fn run<'a>(
        &'a mut self,
        script: &'a str,
        lines: mpsc::Sender<OutputLine>,
    ) -> ChannelFuture<'a, ScriptOutcome> {
        self.record.lock().unwrap().scripts.push(script.to_string());
        let response = self.responses.pop_front().unwrap_or(FakeResponse::Output {
            lines: Vec::new(),
            outcome: ScriptOutcome::Success,
        });

        Box::pin(async move {
            match response {
                FakeResponse::Output { lines: output, outcome } => {
                    for line in output {
                        lines.send(line).await.map_err(anyhow::Error::from)?;
                    }
                    Ok(outcome)
                }
                FakeResponse::Broken(reason) => Err(anyhow::anyhow!(reason).into()),
            }
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.record.lock().unwrap().closes += 1;
        Box::pin(async {})
    }
}

// src/engine/service.rs

//! Invocation surface used by front ends (CLI, web layer, socket consumers).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::config::{ConfigFile, parse_duration};
use crate::errors::{Result, ScreenrunError};
use crate::exec::{ExecutionChannel, RemoteChannel, RemoteTarget};
use crate::fs::FileSystem;
use crate::plugin::{PluginDocument, PluginStore, parse};
use crate::snapshot;

use super::log_sink::LogEntry;
use super::orchestrator::{resolve, resolve_streaming};
use super::{RunEvent, RunOutcome};

/// One request to run a plugin against a host.
///
/// Field aliases accept the names used by the socket front end
/// (`script_name`, `resource_ip`, `password`). `timeout` is an optional
/// duration string (`"5s"`) overriding `[remote].connect_timeout`.
#[derive(Clone, Deserialize)]
pub struct PluginRequest {
    #[serde(alias = "script_name")]
    pub plugin_name: String,
    #[serde(alias = "resource_ip")]
    pub target_host: String,
    pub username: String,
    #[serde(alias = "password")]
    pub secret: String,
    #[serde(default, deserialize_with = "deserialize_timeout")]
    pub timeout: Option<Duration>,
}

fn deserialize_timeout<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match parse_duration(&raw).map_err(<D::Error as de::Error>::custom)? {
        d if d.is_zero() => Err(<D::Error as de::Error>::custom(
            "timeout must be greater than zero",
        )),
        d => Ok(Some(d)),
    }
}

impl fmt::Debug for PluginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRequest")
            .field("plugin_name", &self.plugin_name)
            .field("target_host", &self.target_host)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Streaming wire format: `{"log": "..."}` per entry, then `{"done": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreamMessage {
    Log { log: String },
    Done { done: bool },
}

impl From<&RunEvent> for StreamMessage {
    fn from(event: &RunEvent) -> Self {
        match event {
            RunEvent::Log(entry) => StreamMessage::Log {
                log: entry.to_string(),
            },
            RunEvent::Finished(_) => StreamMessage::Done { done: true },
        }
    }
}

/// Map run events onto the streaming wire format.
pub fn stream_messages<S>(events: S) -> impl Stream<Item = StreamMessage>
where
    S: Stream<Item = RunEvent>,
{
    events.map(|event| StreamMessage::from(&event))
}

/// Runs named plugins from the configured plugin directory.
#[derive(Debug, Clone)]
pub struct PluginService {
    config: ConfigFile,
    fs: Arc<dyn FileSystem>,
    store: PluginStore,
}

impl PluginService {
    pub fn new(config: ConfigFile, fs: Arc<dyn FileSystem>) -> Self {
        let store = PluginStore::new(
            Arc::clone(&fs),
            config.paths.plugin_dir.clone(),
            config.paths.plugin_extension.clone(),
        );
        Self { config, fs, store }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn store(&self) -> &PluginStore {
        &self.store
    }

    pub fn list_plugins(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Read and parse a plugin without running anything.
    pub fn load_document(&self, plugin: &str) -> Result<PluginDocument> {
        let raw = self.store.load(plugin)?;
        let document = parse(&raw);
        info!(
            plugin = %self.store.plugin_name(plugin),
            screens = document.len(),
            pending = document.pending_screens().len(),
            "plugin parsed"
        );
        Ok(document)
    }

    /// Remote channel for `request`, using the configured remote settings.
    pub fn remote_channel(&self, request: &PluginRequest) -> RemoteChannel {
        let mut target = RemoteTarget::new(
            request.target_host.clone(),
            self.config.remote.port,
            request.username.clone(),
            request.secret.clone(),
        );
        if let Some(timeout) = request.timeout {
            target = target.with_timeout(timeout);
        }
        RemoteChannel::new(target, self.config.remote.clone())
    }

    /// Run `request` on its remote host and return the whole outcome.
    pub async fn execute(&self, request: &PluginRequest) -> RunOutcome {
        let mut channel = self.remote_channel(request);
        self.execute_with(&request.plugin_name, &mut channel).await
    }

    /// Run a plugin through any channel.
    pub async fn execute_with<C>(&self, plugin: &str, channel: &mut C) -> RunOutcome
    where
        C: ExecutionChannel + ?Sized,
    {
        match self.load_document(plugin) {
            Ok(document) => resolve(document, channel).await,
            Err(error) => {
                warn!(plugin, error = %error, "plugin could not be loaded");
                RunOutcome::Failed {
                    logs: vec![LogEntry::error(error.to_string())],
                    error,
                }
            }
        }
    }

    /// Streaming form of [`execute`](Self::execute).
    pub fn execute_streaming(&self, request: &PluginRequest) -> ReceiverStream<RunEvent> {
        let channel = self.remote_channel(request);
        self.execute_streaming_with(&request.plugin_name, channel)
    }

    /// Streaming form of [`execute_with`](Self::execute_with).
    pub fn execute_streaming_with<C>(&self, plugin: &str, channel: C) -> ReceiverStream<RunEvent>
    where
        C: ExecutionChannel + 'static,
    {
        match self.load_document(plugin) {
            Ok(document) => resolve_streaming(document, channel),
            Err(error) => {
                warn!(plugin, error = %error, "plugin could not be loaded");
                failed_stream(error)
            }
        }
    }

    /// Write a snapshot of `document` when an output directory is configured.
    pub fn save_snapshot(&self, plugin: &str, document: &PluginDocument) -> Result<Option<PathBuf>> {
        let Some(dir) = self.config.paths.output_dir.as_deref() else {
            return Ok(None);
        };
        let now = chrono::Local::now().naive_local();
        let name = self.store.plugin_name(plugin);
        snapshot::save_snapshot(self.fs.as_ref(), dir, name, document, now).map(Some)
    }
}

fn failed_stream(error: ScreenrunError) -> ReceiverStream<RunEvent> {
    let (tx, rx) = mpsc::channel(2);
    let _ = tx.try_send(RunEvent::Log(LogEntry::error(error.to_string())));
    let _ = tx.try_send(RunEvent::Finished(Err(error)));
    ReceiverStream::new(rx)
}

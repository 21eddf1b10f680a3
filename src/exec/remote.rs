// src/exec/remote.rs

//! Remote execution channel over SSH (`ssh2`, i.e. libssh2).
//!
//! One session is opened per run and shared by every screen. Each screen's
//! combined script is written to a temp file on the remote host, executed,
//! and removed; its output is read with a [`PollLoop`] while the session is
//! in non-blocking mode.
//!
//! libssh2 is blocking, so connect, run and disconnect all happen on the
//! blocking thread pool.

use std::fmt;
use std::future::Future;
use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use ssh2::{Channel, Session};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::RemoteSettings;
use crate::errors::{Result, ScreenrunError};
use crate::types::{OutputLine, OutputStream};

use super::channel::{ChannelFuture, ExecutionChannel, ScriptOutcome};
use super::poll::{ChannelPoison, PollLoop, PollSource, Sleeper, ThreadSleeper};

const HEREDOC_TAG: &str = "SCREENRUN_PLUGIN_EOF";

/// Where to connect and as whom.
#[derive(Clone)]
pub struct RemoteTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    secret: String,
    /// Overrides the configured connect timeout for this target.
    pub timeout: Option<Duration>,
}

impl RemoteTarget {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            secret: secret.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `user@host:port`, without the secret.
    pub fn label(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}

impl fmt::Debug for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub struct RemoteChannel {
    target: RemoteTarget,
    settings: RemoteSettings,
    session: Option<Session>,
    poison: ChannelPoison,
}

impl fmt::Debug for RemoteChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteChannel")
            .field("target", &self.target)
            .field("connected", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl RemoteChannel {
    pub fn new(target: RemoteTarget, settings: RemoteSettings) -> Self {
        Self {
            target,
            settings,
            session: None,
            poison: ChannelPoison::new(),
        }
    }

    /// Handle that makes the next poll of a running script fail.
    pub fn poison_handle(&self) -> ChannelPoison {
        self.poison.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Target override if set, else the configured connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.target.timeout.unwrap_or(self.settings.connect_timeout)
    }
}

impl ExecutionChannel for RemoteChannel {
    fn describe(&self) -> String {
        self.target.label()
    }

    fn open(&mut self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            if self.session.is_some() {
                return Ok(());
            }

            let target = self.target.clone();
            let timeout = self.connect_timeout();
            info!(host = %target.label(), ?timeout, "connecting to remote host");

            let connected = tokio::task::spawn_blocking(move || connect(&target, timeout))
                .await
                .map_err(|e| anyhow!("connect task failed: {e}"))
                .and_then(|r| r);

            match connected {
                Ok(session) => {
                    self.session = Some(session);
                    Ok(())
                }
                Err(err) => Err(ScreenrunError::ConnectionFailed {
                    target: self.target.label(),
                    reason: format!("{err:#}"),
                }),
            }
        })
    }

    fn run<'a>(
        &'a mut self,
        script: &'a str,
        lines: mpsc::Sender<OutputLine>,
    ) -> ChannelFuture<'a, ScriptOutcome> {
        Box::pin(async move {
            let session = self
                .session
                .clone()
                .ok_or_else(|| anyhow!("remote channel is not connected"))?;
            let command = materialize_script(script, &self.settings.tmp_dir);
            let interval = self.settings.poll_interval;
            let poison = self.poison.clone();

            let outcome = tokio::task::spawn_blocking(move || {
                exec_remote(&session, &command, interval, poison, &mut ThreadSleeper, |line| {
                    if lines.blocking_send(line).is_err() {
                        debug!("output receiver dropped; discarding remote output");
                    }
                })
            })
            .await
            .map_err(|e| anyhow!("remote run task failed: {e}"))??;

            Ok(outcome)
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let Some(session) = self.session.take() else {
                return;
            };
            let label = self.target.label();
            let result =
                tokio::task::spawn_blocking(move || session.disconnect(None, "screenrun done", None))
                    .await;
            match result {
                Ok(Ok(())) => info!(host = %label, "remote session closed"),
                Ok(Err(e)) => warn!(host = %label, error = %e, "error while closing remote session"),
                Err(e) => warn!(host = %label, error = %e, "disconnect task failed"),
            }
        })
    }
}

impl Drop for RemoteChannel {
    fn drop(&mut self) {
        // Reached only when `close` was skipped, e.g. the run was aborted.
        if let Some(session) = self.session.take() {
            warn!(host = %self.target.label(), "remote session dropped without close; disconnecting");
            let _ = session.disconnect(None, "screenrun aborted", None);
        }
    }
}

fn connect(target: &RemoteTarget, timeout: Duration) -> anyhow::Result<Session> {
    let addr = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .with_context(|| format!("resolving {}", target.host))?
        .next()
        .ok_or_else(|| anyhow!("no address found for {}", target.host))?;

    let tcp = TcpStream::connect_timeout(&addr, timeout)
        .with_context(|| format!("connecting to {addr}"))?;

    let mut session = Session::new().context("creating ssh session")?;
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session.set_tcp_stream(tcp);
    session.handshake().context("ssh handshake")?;
    session
        .userauth_password(&target.username, &target.secret)
        .context("password authentication")?;

    if !session.authenticated() {
        bail!("authentication rejected for user '{}'", target.username);
    }

    debug!(host = %target.label(), "ssh session established");
    Ok(session)
}

/// Wrap a script so it runs from a temp file on the remote host.
///
/// The quoted heredoc keeps `$VAR`s and backticks for the script itself.
/// Its terminator is chosen so that no script line can end it early.
/// `tmp_dir` is interpolated as is; config validation keeps shell
/// metacharacters out of it. The temp file is removed and the script's exit
/// status propagated.
pub fn materialize_script(script: &str, tmp_dir: &str) -> String {
    let tag = heredoc_tag(script);
    format!(
        "f=$(mktemp \"{tmp_dir}/screenrun.XXXXXX\") || exit 1\n\
         cat > \"$f\" <<'{tag}'\n\
         #!/bin/bash\n\
         {script}\n\
         {tag}\n\
         chmod +x \"$f\"\n\
         \"$f\"\n\
         rc=$?\n\
         rm -f \"$f\"\n\
         exit $rc\n"
    )
}

/// `SCREENRUN_PLUGIN_EOF`, suffixed with a counter while any script line
/// equals it.
fn heredoc_tag(script: &str) -> String {
    let mut tag = HEREDOC_TAG.to_string();
    let mut n = 0u32;
    while script.lines().any(|line| line == tag) {
        n += 1;
        tag = format!("{HEREDOC_TAG}_{n}");
    }
    tag
}

fn exec_remote<Z, F>(
    session: &Session,
    command: &str,
    interval: Duration,
    poison: ChannelPoison,
    sleeper: &mut Z,
    emit: F,
) -> anyhow::Result<ScriptOutcome>
where
    Z: Sleeper,
    F: FnMut(OutputLine),
{
    session.set_blocking(true);
    let mut channel = session.channel_session().context("opening ssh channel")?;
    channel.exec(command).context("starting remote script")?;

    session.set_blocking(false);
    let mut poll = PollLoop::new(interval, poison);
    let polled = poll.run(&mut SshSource { channel: &mut channel }, sleeper, emit);
    session.set_blocking(true);
    polled.context("reading remote output")?;

    channel.wait_close().context("waiting for remote script")?;
    let code = channel.exit_status().context("reading remote exit status")?;
    debug!(exit_code = code, wakes = poll.wakes(), "remote script exited");

    Ok(ScriptOutcome::from_code(code))
}

struct SshSource<'a> {
    channel: &'a mut Channel,
}

impl PollSource for SshSource<'_> {
    fn read_available(&mut self, stream: OutputStream, buf: &mut [u8]) -> io::Result<usize> {
        match stream {
            OutputStream::Stdout => self.channel.read(buf),
            OutputStream::Stderr => self.channel.stderr().read(buf),
        }
    }

    fn is_finished(&mut self) -> bool {
        self.channel.eof()
    }
}

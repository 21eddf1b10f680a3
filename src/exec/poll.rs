// src/exec/poll.rs

//! Poll-based output reader for non-blocking channels.
//!
//! The loop moves through three states:
//!
//! - `Reading`: drain everything currently available on stdout, then on
//!   stderr. If the source reports completion, move to `Draining`. If nothing
//!   arrived, sleep for the poll interval before trying again.
//! - `Draining`: one final drain of both streams, then flush any partial
//!   line still buffered.
//! - `Done`: return.
//!
//! Sleeping goes through [`Sleeper`] so tests can run the loop without real
//! time passing.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::trace;

use crate::types::{OutputLine, OutputStream};

const READ_CHUNK: usize = 8 * 1024;

/// A non-blocking byte source with two output streams.
pub trait PollSource {
    /// Read whatever is available on `stream` into `buf`.
    ///
    /// `Ok(0)` and `ErrorKind::WouldBlock` both mean "nothing right now".
    fn read_available(&mut self, stream: OutputStream, buf: &mut [u8]) -> io::Result<usize>;

    /// True once the remote side has signalled end of output.
    fn is_finished(&mut self) -> bool;
}

pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Blocks the current thread. Only use from blocking contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Shared flag a caller can set to make the next poll fail.
#[derive(Debug, Clone, Default)]
pub struct ChannelPoison(Arc<AtomicBool>);

impl ChannelPoison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poison(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_poisoned(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Reading,
    Draining,
    Done,
}

/// Reads a [`PollSource`] to completion, emitting whole lines.
#[derive(Debug)]
pub struct PollLoop {
    interval: Duration,
    poison: ChannelPoison,
    state: PollState,
    stdout: LineAssembler,
    stderr: LineAssembler,
    wakes: u64,
}

impl PollLoop {
    pub fn new(interval: Duration, poison: ChannelPoison) -> Self {
        Self {
            interval,
            poison,
            state: PollState::Reading,
            stdout: LineAssembler::new(OutputStream::Stdout),
            stderr: LineAssembler::new(OutputStream::Stderr),
            wakes: 0,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Number of times the loop slept waiting for data.
    pub fn wakes(&self) -> u64 {
        self.wakes
    }

    /// Drive the source until it is finished and fully drained.
    pub fn run<S, Z, F>(&mut self, source: &mut S, sleeper: &mut Z, mut emit: F) -> io::Result<()>
    where
        S: PollSource + ?Sized,
        Z: Sleeper + ?Sized,
        F: FnMut(OutputLine),
    {
        let mut buf = vec![0u8; READ_CHUNK];

        loop {
            match self.state {
                PollState::Reading => {
                    if self.poison.is_poisoned() {
                        return Err(io::Error::other("channel closed by caller"));
                    }
                    let read = self.drain(source, &mut buf, &mut emit)?;
                    if source.is_finished() {
                        self.state = PollState::Draining;
                    } else if read == 0 {
                        self.wakes += 1;
                        sleeper.sleep(self.interval);
                    }
                }
                PollState::Draining => {
                    self.drain(source, &mut buf, &mut emit)?;
                    self.stdout.finish(&mut emit);
                    self.stderr.finish(&mut emit);
                    self.state = PollState::Done;
                }
                PollState::Done => return Ok(()),
            }
        }
    }

    /// Read both streams until neither has anything left. Returns bytes read.
    fn drain<S, F>(&mut self, source: &mut S, buf: &mut [u8], emit: &mut F) -> io::Result<usize>
    where
        S: PollSource + ?Sized,
        F: FnMut(OutputLine),
    {
        let mut total = 0;
        for stream in [OutputStream::Stdout, OutputStream::Stderr] {
            let assembler = match stream {
                OutputStream::Stdout => &mut self.stdout,
                OutputStream::Stderr => &mut self.stderr,
            };
            loop {
                match source.read_available(stream, buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        trace!(%stream, bytes = n, "read from channel");
                        assembler.push(&buf[..n], emit);
                        total += n;
                    }
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(total)
    }
}

/// Splits a byte stream into lines, holding back any incomplete tail.
#[derive(Debug)]
pub struct LineAssembler {
    stream: OutputStream,
    pending: Vec<u8>,
}

impl LineAssembler {
    pub fn new(stream: OutputStream) -> Self {
        Self {
            stream,
            pending: Vec::new(),
        }
    }

    pub fn push<F: FnMut(OutputLine)>(&mut self, bytes: &[u8], emit: &mut F) {
        self.pending.extend_from_slice(bytes);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            emit(self.line(&line[..pos]));
        }
    }

    /// Emit the incomplete tail, if any.
    pub fn finish<F: FnMut(OutputLine)>(&mut self, emit: &mut F) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            emit(self.line(&rest));
        }
    }

    fn line(&self, bytes: &[u8]) -> OutputLine {
        OutputLine::from_raw(self.stream, bytes)
    }
}

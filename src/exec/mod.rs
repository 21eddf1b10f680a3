// src/exec/mod.rs

//! Script execution layer.
//!
//! - [`channel`] defines the `ExecutionChannel` trait the orchestrator runs
//!   screens through, plus a buffered `run_collect` helper.
//! - [`local`] runs scripts with the local shell via `tokio::process`.
//! - [`remote`] runs scripts on a remote host over one SSH session per run.
//! - [`poll`] is the non-blocking read loop the remote channel uses.

pub mod channel;
pub mod local;
pub mod poll;
pub mod remote;

pub use channel::{ChannelFuture, ExecutionChannel, LINE_BUFFER, ScriptOutcome, run_collect};
pub use local::LocalChannel;
pub use poll::{ChannelPoison, PollLoop, PollSource, PollState, Sleeper, ThreadSleeper};
pub use remote::{RemoteChannel, RemoteTarget};

// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::parse_duration;

/// Command-line arguments for `screenrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "screenrun",
    version,
    about = "Run screen-based diagnostic plugins locally or on a remote host.",
    long_about = None
)]
pub struct CliArgs {
    /// Plugin to run (file name in the plugin directory, with or without `.sh`).
    #[arg(value_name = "PLUGIN", required_unless_present = "list")]
    pub plugin: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `$SCREENRUN_CONFIG`, else `Screenrun.toml` if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remote host to run the plugin on.
    #[arg(long, value_name = "HOST", required_unless_present_any = ["local", "dry_run", "list"])]
    pub host: Option<String>,

    /// User to authenticate as on the remote host.
    #[arg(long, value_name = "USER", required_unless_present_any = ["local", "dry_run", "list"])]
    pub user: Option<String>,

    /// SSH port; overrides `[remote].port`.
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Environment variable holding the password.
    #[arg(long, value_name = "VAR", default_value = "SCREENRUN_PASSWORD")]
    pub password_env: String,

    /// Connect timeout (e.g. `5s`); overrides `[remote].connect_timeout`.
    #[arg(long, value_name = "DURATION", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Run the plugin's commands with the local shell instead of over SSH.
    #[arg(long, conflicts_with_all = ["host", "user"])]
    pub local: bool,

    /// Parse the plugin and print its screens without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit `{"log": ...}` JSON lines while running, then `{"done": true}`.
    #[arg(long, conflicts_with = "json")]
    pub stream: bool,

    /// Print the outcome as JSON instead of rendered screens.
    #[arg(long)]
    pub json: bool,

    /// Save a JSON snapshot to `[paths].output_dir`.
    #[arg(long)]
    pub save: bool,

    /// Print a table cell after the run, as `SCREEN:ROW:COLUMN` (repeatable).
    #[arg(long, value_name = "S:R:C", value_parser = parse_cell_ref)]
    pub cell: Vec<CellRef>,

    /// List available plugins and exit.
    #[arg(long)]
    pub list: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SCREENRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Position of a table cell: screen, data row, column (all 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub screen: usize,
    pub row: usize,
    pub column: usize,
}

fn parse_cell_ref(s: &str) -> Result<CellRef, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let [screen, row, column] = parts.as_slice() else {
        return Err(format!("expected SCREEN:ROW:COLUMN, got '{s}'"));
    };
    let index = |part: &str, what: &str| {
        part.parse::<usize>()
            .map_err(|e| format!("invalid {what} index '{part}': {e}"))
    };
    Ok(CellRef {
        screen: index(*screen, "screen")?,
        row: index(*row, "row")?,
        column: index(*column, "column")?,
    })
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    match parse_duration(s)? {
        d if d.is_zero() => Err("timeout must be greater than zero".to_string()),
        d => Ok(d),
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod plugin;
pub mod snapshot;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::cli::{CellRef, CliArgs};
use crate::config::load_config;
use crate::engine::{PluginService, RunEvent, StreamMessage};
use crate::exec::{ExecutionChannel, LocalChannel, RemoteChannel, RemoteTarget};
use crate::fs::RealFileSystem;
use crate::plugin::{PluginDocument, render_screens};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the plugin service over the real filesystem
/// - a local or remote execution channel
/// - batch or streaming output, cell lookups and snapshots
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        cfg.remote.port = port;
    }
    debug!(?cfg, "configuration loaded");

    let service = PluginService::new(cfg, Arc::new(RealFileSystem));

    if args.list {
        for name in service.list_plugins()? {
            println!("{name}");
        }
        return Ok(());
    }

    let plugin = args
        .plugin
        .as_deref()
        .context("a plugin name is required")?;

    if args.dry_run {
        let document = service.load_document(plugin)?;
        print_document(&document, args.json)?;
        return Ok(());
    }

    let channel = build_channel(&args, &service)?;

    let document = if args.stream {
        run_streaming(&service, plugin, channel).await?
    } else {
        run_batch(&service, plugin, channel, args.json).await?
    };

    print_cells(&document, &args.cell);

    if args.save {
        match service.save_snapshot(plugin, &document)? {
            Some(path) => eprintln!("snapshot saved to {}", path.display()),
            None => warn!("--save given but [paths].output_dir is not configured"),
        }
    }

    Ok(())
}

fn build_channel(args: &CliArgs, service: &PluginService) -> Result<Box<dyn ExecutionChannel>> {
    if args.local {
        return Ok(Box::new(LocalChannel::new()));
    }

    let host = args.host.clone().context("--host is required for remote runs")?;
    let user = args.user.clone().context("--user is required for remote runs")?;
    let secret = std::env::var(&args.password_env)
        .with_context(|| format!("reading password from ${}", args.password_env))?;

    let settings = service.config().remote.clone();
    let mut target = RemoteTarget::new(host, settings.port, user, secret);
    if let Some(timeout) = args.timeout {
        target = target.with_timeout(timeout);
    }

    Ok(Box::new(RemoteChannel::new(target, settings)))
}

async fn run_batch(
    service: &PluginService,
    plugin: &str,
    mut channel: Box<dyn ExecutionChannel>,
    json: bool,
) -> Result<PluginDocument> {
    let outcome = service.execute_with(plugin, &mut channel).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for entry in outcome.logs() {
            eprintln!("{entry}");
        }
    }

    let (document, _logs) = outcome.into_result()?;
    if !json {
        print!("{}", render_screens(&document));
    }
    Ok(document)
}

async fn run_streaming(
    service: &PluginService,
    plugin: &str,
    channel: Box<dyn ExecutionChannel>,
) -> Result<PluginDocument> {
    let mut events = service.execute_streaming_with(plugin, channel);
    let mut finished = None;

    while let Some(event) = events.next().await {
        println!("{}", serde_json::to_string(&StreamMessage::from(&event))?);
        if let RunEvent::Finished(result) = event {
            finished = Some(result);
        }
    }

    let result = finished.context("run ended without a final event")?;
    Ok(result?)
}

fn print_document(document: &PluginDocument, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(document)?);
    } else {
        print!("{}", render_screens(document));
    }
    Ok(())
}

fn print_cells(document: &PluginDocument, cells: &[CellRef]) {
    for cell in cells {
        match document.cell_value(cell.screen, cell.row, cell.column) {
            Ok(value) => println!("{}:{}:{} {value}", cell.screen, cell.row, cell.column),
            Err(e) => eprintln!("{}:{}:{} error: {e}", cell.screen, cell.row, cell.column),
        }
    }
}

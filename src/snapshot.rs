// src/snapshot.rs

//! JSON snapshots of resolved documents.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::plugin::PluginDocument;

/// `<plugin>_<YYYYMMDD_HHMMSS>.json`
pub fn snapshot_file_name(plugin: &str, at: NaiveDateTime) -> String {
    format!("{plugin}_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Serialize `document` with 4-space indentation.
pub fn to_pretty_json(document: &PluginDocument) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    document.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the snapshot into `dir` and return its path.
pub fn save_snapshot(
    fs: &dyn FileSystem,
    dir: &Path,
    plugin: &str,
    document: &PluginDocument,
    at: NaiveDateTime,
) -> Result<PathBuf> {
    let path = dir.join(snapshot_file_name(plugin, at));
    let json = to_pretty_json(document)?;
    fs.write(&path, json.as_bytes())?;
    info!(plugin, path = ?path, "snapshot saved");
    Ok(path)
}

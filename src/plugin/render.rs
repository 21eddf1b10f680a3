// src/plugin/render.rs

//! Plain-text rendering of screens for the terminal.

use std::fmt::Write as _;

use super::model::{ContentEntry, PLACEHOLDER_MARKER, PluginDocument};

/// Render every screen as a titled block.
///
/// Table rows given as cells are joined by tabs; placeholders (only present
/// before resolution) show as `$CMD_OUTPUT`.
pub fn render_screens(document: &PluginDocument) -> String {
    let mut out = String::new();

    for (index, screen) in document.screens().iter().enumerate() {
        let _ = writeln!(out, "\n=== Screen {} ===", index + 1);
        let _ = writeln!(out, "Screen Name: {}", screen.name);

        for entry in screen.content() {
            match entry {
                ContentEntry::Text(line) => {
                    let _ = writeln!(out, "{line}");
                }
                ContentEntry::Row(cells) => {
                    let _ = writeln!(out, "{}", cells.join("\t"));
                }
                ContentEntry::Placeholder(_) => {
                    let _ = writeln!(out, "{PLACEHOLDER_MARKER}");
                }
            }
        }
    }

    out
}

// src/plugin/table.rs

//! Positional cell lookup on resolved table screens.
//!
//! Row 0 of a table screen is its header and is never addressable; `row` is
//! an index into the data rows. Text rows are split on whitespace, so a cell
//! value containing spaces comes back as several cells.

use crate::errors::AccessorError;

use super::model::{ContentEntry, PluginDocument};

/// Fetch the cell at (`screen`, `row`, `column`).
///
/// `document` is `None` when nothing has been resolved yet.
pub fn cell_value(
    document: Option<&PluginDocument>,
    screen: usize,
    row: usize,
    column: usize,
) -> Result<String, AccessorError> {
    let document = match document {
        Some(doc) if !doc.is_empty() && doc.is_resolved() => doc,
        _ => return Err(AccessorError::NotLoaded),
    };

    let table = document
        .screen(screen)
        .ok_or(AccessorError::ScreenOutOfRange {
            index: screen,
            len: document.len(),
        })?;

    if !table.is_table {
        return Err(AccessorError::NotATable(screen));
    }

    let rows = table.content();
    let data_rows = rows.len().saturating_sub(1);
    if row >= data_rows {
        return Err(AccessorError::RowOutOfRange {
            row,
            rows: data_rows,
        });
    }

    let cells: Vec<&str> = match &rows[row + 1] {
        ContentEntry::Row(cells) => cells.iter().map(String::as_str).collect(),
        ContentEntry::Text(line) => line.split_whitespace().collect(),
        // Unreachable on a resolved document.
        ContentEntry::Placeholder(_) => return Err(AccessorError::NotLoaded),
    };

    cells
        .get(column)
        .map(|cell| cell.to_string())
        .ok_or(AccessorError::ColumnOutOfRange {
            column,
            columns: cells.len(),
        })
}

impl PluginDocument {
    /// See [`cell_value`].
    pub fn cell_value(
        &self,
        screen: usize,
        row: usize,
        column: usize,
    ) -> Result<String, AccessorError> {
        cell_value(Some(self), screen, row, column)
    }
}

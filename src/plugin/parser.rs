// src/plugin/parser.rs

//! Line-oriented plugin parser.
//!
//! ```text
//! @-
//! display-mode="1"
//! screen_name="Disks"
//! table_columns=Filesystem, Size, Used
//! $
//! df -h | tail -n +2
//! $
//! -@
//! ```
//!
//! Parsing is total: unterminated screens and command blocks are closed at
//! end of input, and text outside any screen is ignored.
//!
//! Lines are right-trimmed before matching; leading whitespace is kept.
//! The screen markers `@-` / `-@` are honoured everywhere, including inside
//! a command block. Directives are only recognised outside command blocks.

use tracing::trace;

use super::model::{ContentEntry, PluginDocument, Screen};

const SCREEN_OPEN: &str = "@-";
const SCREEN_CLOSE: &str = "-@";
const BLOCK_TOGGLE: &str = "$";

const DISPLAY_MODE: &str = "display-mode=";
const SCREEN_NAME: &str = "screen_name=";
const TABLE_COLUMNS: &str = "table_columns=";

/// Parse raw plugin text into a document.
pub fn parse(raw: &str) -> PluginDocument {
    let mut parser = Parser::default();
    for line in raw.lines() {
        parser.feed(line.trim_end());
    }
    parser.finish()
}

#[derive(Debug, Default)]
struct Parser {
    screens: Vec<Screen>,
    current: Option<Screen>,
    in_block: bool,
    block: Vec<String>,
}

impl Parser {
    fn feed(&mut self, line: &str) {
        match line {
            SCREEN_OPEN => {
                self.close_screen();
                self.current = Some(Screen::default());
                return;
            }
            SCREEN_CLOSE => {
                self.close_screen();
                return;
            }
            _ => {}
        }

        let Some(screen) = self.current.as_mut() else {
            trace!(line, "ignoring line outside of any screen");
            return;
        };

        if line == BLOCK_TOGGLE {
            if self.in_block {
                flush_block(screen, &mut self.block);
            } else {
                self.block.clear();
            }
            self.in_block = !self.in_block;
            return;
        }

        if self.in_block {
            self.block.push(line.to_string());
            return;
        }

        if let Some(value) = line.strip_prefix(DISPLAY_MODE) {
            screen.is_table = unquote(value) == "1";
        } else if let Some(value) = line.strip_prefix(SCREEN_NAME) {
            screen.name = unquote(value);
        } else if let Some(value) = line
            .strip_prefix(TABLE_COLUMNS)
            .filter(|_| screen.is_table)
        {
            let columns = value.split(',').map(|c| c.trim().to_string()).collect();
            screen.content.push(ContentEntry::Row(columns));
        } else {
            screen.push_text(line);
        }
    }

    /// Flush any open block into the current screen and append the screen.
    fn close_screen(&mut self) {
        if let Some(mut screen) = self.current.take() {
            flush_block(&mut screen, &mut self.block);
            self.screens.push(screen);
        }
        self.in_block = false;
        self.block.clear();
    }

    fn finish(mut self) -> PluginDocument {
        self.close_screen();
        PluginDocument::new(self.screens)
    }
}

/// Turn buffered block lines into a command block + placeholder.
///
/// An empty buffer produces nothing.
fn flush_block(screen: &mut Screen, block: &mut Vec<String>) {
    if block.is_empty() {
        return;
    }
    let body = block.join("\n");
    block.clear();
    screen.push_command_block(body);
}

/// Directive values may be quoted; every double quote is dropped.
fn unquote(value: &str) -> String {
    value.trim().replace('"', "")
}

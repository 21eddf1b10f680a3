// src/plugin/model.rs

//! Parsed plugin structure.
//!
//! A [`PluginDocument`] is an ordered list of [`Screen`]s. Before resolution
//! a screen carries raw command blocks plus one [`ContentEntry::Placeholder`]
//! per block; after resolution the placeholders are gone and the blocks are
//! cleared.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Marker written in place of an unresolved placeholder when a document is
/// serialized or rendered before execution.
pub const PLACEHOLDER_MARKER: &str = "$CMD_OUTPUT";

/// One entry of a screen's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEntry {
    /// A free-form text line (also used for data rows of table screens).
    Text(String),
    /// A structured row; only produced by a `table_columns=` directive.
    Row(Vec<String>),
    /// Output of the command block with this index belongs here.
    Placeholder(usize),
}

impl ContentEntry {
    pub fn text(line: impl Into<String>) -> Self {
        ContentEntry::Text(line.into())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ContentEntry::Placeholder(_))
    }
}

impl Serialize for ContentEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentEntry::Text(line) => serializer.serialize_str(line),
            ContentEntry::Row(cells) => cells.serialize(serializer),
            ContentEntry::Placeholder(_) => serializer.serialize_str(PLACEHOLDER_MARKER),
        }
    }
}

/// One declared display unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    pub name: String,
    pub is_table: bool,
    pub(crate) content: Vec<ContentEntry>,
    pub(crate) command_blocks: Vec<String>,
}

impl Screen {
    pub fn new(name: impl Into<String>, is_table: bool) -> Self {
        Self {
            name: name.into(),
            is_table,
            ..Self::default()
        }
    }

    pub fn content(&self) -> &[ContentEntry] {
        &self.content
    }

    pub fn command_blocks(&self) -> &[String] {
        &self.command_blocks
    }

    pub fn has_commands(&self) -> bool {
        !self.command_blocks.is_empty()
    }

    pub fn push_text(&mut self, line: impl Into<String>) {
        self.content.push(ContentEntry::Text(line.into()));
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content
            .push(ContentEntry::Row(cells.into_iter().map(Into::into).collect()));
    }

    /// Append a command block and its placeholder at the current position.
    ///
    /// Keeps placeholders and blocks in lockstep.
    pub fn push_command_block(&mut self, body: impl Into<String>) {
        let index = self.command_blocks.len();
        self.command_blocks.push(body.into());
        self.content.push(ContentEntry::Placeholder(index));
    }

    pub fn placeholder_count(&self) -> usize {
        self.content.iter().filter(|e| e.is_placeholder()).count()
    }

    /// All command blocks joined into one script, in block order.
    pub fn combined_script(&self) -> String {
        self.command_blocks.join("\n")
    }

    /// Substitute captured output for this screen's placeholders.
    ///
    /// Output is attributed per screen, not per block: the whole batch lands
    /// at the first placeholder and any later placeholders collapse to
    /// nothing. Command blocks are cleared.
    pub fn resolve(&mut self, output: Vec<String>) {
        let mut output = Some(output);
        let mut resolved = Vec::with_capacity(self.content.len());

        for entry in self.content.drain(..) {
            match entry {
                ContentEntry::Placeholder(_) => {
                    if let Some(lines) = output.take() {
                        resolved.extend(lines.into_iter().map(ContentEntry::Text));
                    }
                }
                other => resolved.push(other),
            }
        }

        self.content = resolved;
        self.command_blocks.clear();
    }
}

impl Serialize for Screen {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Screen", 3)?;
        state.serialize_field("screen_name", &self.name)?;
        state.serialize_field("is_table", &self.is_table)?;
        state.serialize_field("content", &self.content)?;
        state.end()
    }
}

/// Ordered screens produced by one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginDocument {
    pub(crate) screens: Vec<Screen>,
}

impl PluginDocument {
    pub fn new(screens: Vec<Screen>) -> Self {
        Self { screens }
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn screen(&self, index: usize) -> Option<&Screen> {
        self.screens.get(index)
    }

    pub(crate) fn screen_mut(&mut self, index: usize) -> Option<&mut Screen> {
        self.screens.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn into_screens(self) -> Vec<Screen> {
        self.screens
    }

    /// Indices of screens that still have command blocks to run.
    pub fn pending_screens(&self) -> Vec<usize> {
        self.screens
            .iter()
            .enumerate()
            .filter(|(_, s)| s.has_commands())
            .map(|(i, _)| i)
            .collect()
    }

    /// True once no screen carries command blocks or placeholders.
    pub fn is_resolved(&self) -> bool {
        self.screens
            .iter()
            .all(|s| !s.has_commands() && s.placeholder_count() == 0)
    }
}

impl Serialize for PluginDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.screens.serialize(serializer)
    }
}

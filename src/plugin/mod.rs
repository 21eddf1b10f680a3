// src/plugin/mod.rs

//! Plugin scripts: model, parser, table access and rendering.
//!
//! - [`model`] holds the screen data structures.
//! - [`parser`] turns raw plugin text into a [`PluginDocument`].
//! - [`table`] extracts single cells from resolved table screens.
//! - [`render`] prints screens for the terminal.
//! - [`store`] finds and reads plugin files in the plugin directory.

pub mod model;
pub mod parser;
pub mod render;
pub mod store;
pub mod table;

pub use model::{ContentEntry, PLACEHOLDER_MARKER, PluginDocument, Screen};
pub use parser::parse;
pub use render::render_screens;
pub use store::PluginStore;
pub use table::cell_value;

// src/plugin/store.rs

//! Read-only access to the plugin directory.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, ScreenrunError};
use crate::fs::FileSystem;

/// Locates and reads `<name>.<extension>` files in one directory.
#[derive(Debug, Clone)]
pub struct PluginStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    extension: String,
}

impl PluginStore {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            fs,
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Plugin names are accepted with or without the file extension.
    pub fn plugin_name<'a>(&self, name: &'a str) -> &'a str {
        name.strip_suffix(&format!(".{}", self.extension))
            .unwrap_or(name)
    }

    /// Path of the file backing `name`.
    ///
    /// Names that would escape the plugin directory are rejected as not found.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let name = self.plugin_name(name);
        let mut components = Path::new(name).components();
        let is_plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if name.is_empty() || !is_plain {
            return Err(ScreenrunError::PluginNotFound(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.{}", self.extension)))
    }

    /// Read the raw plugin text.
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.path_for(name)?;
        let name = self.plugin_name(name);

        if !self.fs.is_file(&path) {
            debug!(plugin = %name, path = ?path, "plugin file missing");
            return Err(ScreenrunError::PluginNotFound(name.to_string()));
        }

        self.fs
            .read_to_string(&path)
            .map_err(|e| ScreenrunError::PluginUnreadable {
                name: name.to_string(),
                reason: format!("{e:#}"),
            })
    }

    /// Names of every plugin in the directory, sorted.
    ///
    /// A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.fs.is_dir(&self.dir) {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = self
            .fs
            .read_dir(&self.dir)?
            .into_iter()
            .filter(|p| self.fs.is_file(p))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str()))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }
}

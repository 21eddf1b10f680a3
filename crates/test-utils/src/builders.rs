#![allow(dead_code)]

use screenrun::config::{ConfigFile, RawConfigFile};

/// Builder for one `@- ... -@` screen of plugin text.
pub struct ScreenScriptBuilder {
    lines: Vec<String>,
}

impl ScreenScriptBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.lines.push(format!("screen_name=\"{name}\""));
        self
    }

    pub fn table(mut self) -> Self {
        self.lines.push("display-mode=\"1\"".to_string());
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.lines.push(format!("table_columns={}", columns.join(", ")));
        self
    }

    pub fn text(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// A `$ ... $` command block.
    pub fn block(mut self, commands: &[&str]) -> Self {
        self.lines.push("$".to_string());
        self.lines.extend(commands.iter().map(|c| c.to_string()));
        self.lines.push("$".to_string());
        self
    }

    pub fn build(self) -> String {
        let mut out = vec!["@-".to_string()];
        out.extend(self.lines);
        out.push("-@".to_string());
        out.join("\n")
    }
}

impl Default for ScreenScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Join built screens into one plugin text.
pub fn plugin_text(screens: &[String]) -> String {
    let mut text = screens.join("\n");
    text.push('\n');
    text
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn plugin_dir(mut self, dir: &str) -> Self {
        self.config.paths.plugin_dir = dir.to_string();
        self
    }

    pub fn output_dir(mut self, dir: &str) -> Self {
        self.config.paths.output_dir = Some(dir.to_string());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.remote.port = port;
        self
    }

    pub fn connect_timeout(mut self, duration: &str) -> Self {
        self.config.remote.connect_timeout = duration.to_string();
        self
    }

    pub fn poll_interval(mut self, duration: &str) -> Self {
        self.config.remote.poll_interval = duration.to_string();
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

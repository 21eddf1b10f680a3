// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from `Screenrun.toml`, before validation.
///
/// ```toml
/// [paths]
/// plugin_dir = "custom_plugins"
/// output_dir = "plugin_json"
///
/// [remote]
/// port = 22
/// connect_timeout = "10s"
/// poll_interval = "20ms"
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: RawPathsSection,

    #[serde(default)]
    pub remote: RawRemoteSection,
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPathsSection {
    /// Directory holding `<plugin>.<plugin_extension>` files.
    #[serde(default = "default_plugin_dir")]
    pub plugin_dir: String,

    /// Where result snapshots are written. Snapshots are disabled when unset.
    #[serde(default)]
    pub output_dir: Option<String>,

    #[serde(default = "default_plugin_extension")]
    pub plugin_extension: String,
}

fn default_plugin_dir() -> String {
    "custom_plugins".to_string()
}

fn default_plugin_extension() -> String {
    "sh".to_string()
}

impl Default for RawPathsSection {
    fn default() -> Self {
        Self {
            plugin_dir: default_plugin_dir(),
            output_dir: None,
            plugin_extension: default_plugin_extension(),
        }
    }
}

/// `[remote]` section. Durations use `ms`, `s`, `m` or `h` suffixes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRemoteSection {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: String,

    /// Sleep between polls of a remote channel with no data.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Remote directory for materialized scripts.
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: String,
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> String {
    "10s".to_string()
}

fn default_poll_interval() -> String {
    "20ms".to_string()
}

fn default_tmp_dir() -> String {
    "/tmp".to_string()
}

impl Default for RawRemoteSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout: default_connect_timeout(),
            poll_interval: default_poll_interval(),
            tmp_dir: default_tmp_dir(),
        }
    }
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathsConfig,
    pub remote: RemoteSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    pub plugin_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub plugin_extension: String,
}

/// Settings shared by every remote channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub port: u16,
    pub connect_timeout: Duration,
    pub poll_interval: Duration,
    pub tmp_dir: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(20),
            tmp_dir: default_tmp_dir(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                plugin_dir: PathBuf::from(default_plugin_dir()),
                output_dir: None,
                plugin_extension: default_plugin_extension(),
            },
            remote: RemoteSettings::default(),
        }
    }
}

// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{
    ConfigFile, PathsConfig, RawConfigFile, RawPathsSection, RawRemoteSection, RemoteSettings,
};
use crate::errors::{Result, ScreenrunError};

const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Characters that are live inside the double-quoted remote `mktemp` path.
const SHELL_UNSAFE: &[char] = &['"', '$', '`', '\\'];

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ScreenrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let paths = validate_paths(raw.paths)?;
        let remote = validate_remote(&raw.remote)?;
        Ok(ConfigFile { paths, remote })
    }
}

fn validate_paths(raw: RawPathsSection) -> Result<PathsConfig> {
    if raw.plugin_dir.trim().is_empty() {
        return Err(config_error("[paths].plugin_dir must not be empty"));
    }

    let extension = raw.plugin_extension.trim().trim_start_matches('.');
    if extension.is_empty() {
        return Err(config_error("[paths].plugin_extension must not be empty"));
    }

    let output_dir = match raw.output_dir {
        Some(dir) if dir.trim().is_empty() => {
            return Err(config_error(
                "[paths].output_dir must not be empty (omit it to disable snapshots)",
            ));
        }
        other => other.map(PathBuf::from),
    };

    Ok(PathsConfig {
        plugin_dir: PathBuf::from(raw.plugin_dir),
        output_dir,
        plugin_extension: extension.to_string(),
    })
}

fn validate_remote(raw: &RawRemoteSection) -> Result<RemoteSettings> {
    if raw.port == 0 {
        return Err(config_error("[remote].port must be >= 1 (got 0)"));
    }

    let connect_timeout = parse_duration(&raw.connect_timeout)
        .map_err(|e| config_error(format!("[remote].connect_timeout: {e}")))?;
    if connect_timeout.is_zero() {
        return Err(config_error("[remote].connect_timeout must be greater than zero"));
    }

    let poll_interval = parse_duration(&raw.poll_interval)
        .map_err(|e| config_error(format!("[remote].poll_interval: {e}")))?;
    if poll_interval.is_zero() || poll_interval > MAX_POLL_INTERVAL {
        return Err(config_error(format!(
            "[remote].poll_interval must be between 1ms and {}ms (got '{}')",
            MAX_POLL_INTERVAL.as_millis(),
            raw.poll_interval
        )));
    }

    if !raw.tmp_dir.starts_with('/') {
        return Err(config_error(format!(
            "[remote].tmp_dir must be an absolute path (got '{}')",
            raw.tmp_dir
        )));
    }

    if let Some(c) = raw.tmp_dir.chars().find(|c| SHELL_UNSAFE.contains(c)) {
        return Err(config_error(format!(
            "[remote].tmp_dir must not contain '{c}' (got '{}')",
            raw.tmp_dir
        )));
    }

    Ok(RemoteSettings {
        port: raw.port,
        connect_timeout,
        poll_interval,
        tmp_dir: raw.tmp_dir.trim_end_matches('/').to_string(),
    })
}

fn config_error(msg: impl Into<String>) -> ScreenrunError {
    ScreenrunError::ConfigError(msg.into())
}

/// Parse a simple duration string like `"20ms"`, `"3s"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;

    let secs_per_unit = match unit_part.trim().to_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        unit => {
            return Err(format!(
                "unsupported duration unit '{unit}'; expected ms, s, m, or h"
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

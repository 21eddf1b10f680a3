// tests/integration/config_loading.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use screenrun::config::{ConfigFile, load_and_validate, load_config, parse_duration};
use screenrun::errors::ScreenrunError;
use screenrun_test_utils::builders::ConfigFileBuilder;
use tempfile::NamedTempFile;

use crate::common::TestResult;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn config_error(contents: &str) -> String {
    let file = write_config(contents);
    match load_and_validate(file.path()) {
        Err(ScreenrunError::ConfigError(msg)) => msg,
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn empty_file_uses_defaults() -> TestResult {
    let file = write_config("");
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.paths.plugin_dir, PathBuf::from("custom_plugins"));
    assert_eq!(cfg.paths.output_dir, None);
    assert_eq!(cfg.paths.plugin_extension, "sh");
    assert_eq!(cfg.remote.port, 22);
    assert_eq!(cfg.remote.connect_timeout, Duration::from_secs(10));
    assert_eq!(cfg.remote.poll_interval, Duration::from_millis(20));
    assert_eq!(cfg.remote.tmp_dir, "/tmp");
    Ok(())
}

#[test]
fn full_file_is_read() -> TestResult {
    let file = write_config(
        r#"
[paths]
plugin_dir = "plugins"
output_dir = "plugin_json"
plugin_extension = ".bash"

[remote]
port = 2222
connect_timeout = "3s"
poll_interval = "50ms"
tmp_dir = "/var/tmp/"
"#,
    );
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.paths.plugin_dir, PathBuf::from("plugins"));
    assert_eq!(cfg.paths.output_dir, Some(PathBuf::from("plugin_json")));
    assert_eq!(cfg.paths.plugin_extension, "bash");
    assert_eq!(cfg.remote.port, 2222);
    assert_eq!(cfg.remote.connect_timeout, Duration::from_secs(3));
    assert_eq!(cfg.remote.poll_interval, Duration::from_millis(50));
    assert_eq!(cfg.remote.tmp_dir, "/var/tmp");
    Ok(())
}

#[test]
fn builder_matches_defaults() {
    let built = ConfigFileBuilder::new().build();
    let default = ConfigFile::default();
    assert_eq!(built.paths.plugin_dir, default.paths.plugin_dir);
    assert_eq!(built.remote.port, default.remote.port);
    assert_eq!(built.remote.poll_interval, default.remote.poll_interval);
}

#[test]
fn port_zero_is_rejected() {
    let msg = config_error("[remote]\nport = 0\n");
    assert!(msg.contains("port"), "unexpected message: {msg}");
}

#[test]
fn poll_interval_must_be_positive_and_bounded() {
    let zero = config_error("[remote]\npoll_interval = \"0ms\"\n");
    assert!(zero.contains("poll_interval"));

    let slow = config_error("[remote]\npoll_interval = \"2s\"\n");
    assert!(slow.contains("poll_interval"));
}

#[test]
fn bad_duration_unit_is_reported() {
    let msg = config_error("[remote]\nconnect_timeout = \"10 parsecs\"\n");
    assert!(msg.contains("connect_timeout"));
    assert!(msg.contains("unsupported duration unit"));
}

#[test]
fn relative_tmp_dir_is_rejected() {
    let msg = config_error("[remote]\ntmp_dir = \"tmp\"\n");
    assert!(msg.contains("absolute"));
}

#[test]
fn empty_plugin_dir_and_output_dir_are_rejected() {
    assert!(config_error("[paths]\nplugin_dir = \"  \"\n").contains("plugin_dir"));
    assert!(config_error("[paths]\noutput_dir = \"\"\n").contains("output_dir"));
}

#[test]
fn unknown_keys_are_toml_errors() {
    let file = write_config("[paths]\nplugins = \"x\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ScreenrunError::TomlError(_))
    ));
}

#[test]
fn explicit_missing_config_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        load_config(Some(&missing)),
        Err(ScreenrunError::IoError(_))
    ));
}

#[test]
fn durations_parse_with_units() {
    assert_eq!(parse_duration("20ms"), Ok(Duration::from_millis(20)));
    assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("15").is_err());
    assert!(parse_duration("").is_err());
    assert!(parse_duration("ms").is_err());
}

#[test]
fn oversized_durations_are_errors_not_overflows() {
    let err = parse_duration("18446744073709551615h").unwrap_err();
    assert!(err.contains("too large"), "unexpected message: {err}");
    assert!(parse_duration("18446744073709551615m").is_err());
    assert_eq!(
        parse_duration("18446744073709551615s"),
        Ok(Duration::from_secs(u64::MAX))
    );

    let msg = config_error("[remote]\nconnect_timeout = \"99999999999999999999h\"\n");
    assert!(msg.contains("connect_timeout"));
}

#[test]
fn tmp_dir_with_shell_metacharacters_is_rejected() {
    for bad in ["/tmp/$HOME", "/tmp/`id`", "/tmp/a\\\"b", "/tmp/a\\\\b"] {
        let msg = config_error(&format!("[remote]\ntmp_dir = \"{bad}\"\n"));
        assert!(msg.contains("tmp_dir"), "{bad}: {msg}");
    }
}

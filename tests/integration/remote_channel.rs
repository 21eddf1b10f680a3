// tests/integration/remote_channel.rs

use std::time::Duration;

use screenrun::config::RemoteSettings;
use screenrun::errors::ScreenrunError;
use screenrun::exec::remote::materialize_script;
use screenrun::exec::{ExecutionChannel, RemoteChannel, RemoteTarget, run_collect};
use screenrun_test_utils::init_tracing;

fn target() -> RemoteTarget {
    RemoteTarget::new("127.0.0.1", 1, "admin", "s3cret")
}

#[test]
fn target_label_and_debug_hide_the_secret() {
    let target = target().with_timeout(Duration::from_secs(2));
    assert_eq!(target.label(), "admin@127.0.0.1:1");

    let debug = format!("{target:?}");
    assert!(!debug.contains("s3cret"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn materialized_script_runs_from_a_temp_file() {
    let command = materialize_script("echo \"$HOME\"\nuptime", "/var/tmp");

    assert!(command.starts_with("f=$(mktemp \"/var/tmp/screenrun.XXXXXX\") || exit 1\n"));
    assert!(command.contains("<<'SCREENRUN_PLUGIN_EOF'\n#!/bin/bash\necho \"$HOME\"\nuptime\nSCREENRUN_PLUGIN_EOF\n"));
    assert!(command.contains("chmod +x \"$f\"\n\"$f\"\nrc=$?\nrm -f \"$f\"\nexit $rc"));
}

#[tokio::test]
async fn refused_connection_is_connection_failed() {
    init_tracing();

    let mut channel = RemoteChannel::new(target(), RemoteSettings::default());
    assert_eq!(channel.describe(), "admin@127.0.0.1:1");

    let err = channel.open().await.expect_err("nothing listens on port 1");
    match err {
        ScreenrunError::ConnectionFailed { target, reason } => {
            assert_eq!(target, "admin@127.0.0.1:1");
            assert!(!reason.contains("s3cret"));
        }
        other => panic!("expected ConnectionFailed, got {other:?}"),
    }
    assert!(!channel.is_connected());
    channel.close().await;
}

#[tokio::test]
async fn running_without_a_session_is_a_channel_error() {
    init_tracing();

    let mut channel = RemoteChannel::new(target(), RemoteSettings::default());
    let result = run_collect(&mut channel, "uptime").await;
    assert!(matches!(result, Err(ScreenrunError::Other(_))));
}

#[test]
fn heredoc_terminator_never_matches_a_script_line() {
    let script = "echo start\nSCREENRUN_PLUGIN_EOF\nSCREENRUN_PLUGIN_EOF_1\necho end";
    let command = materialize_script(script, "/tmp");

    assert!(command.contains("<<'SCREENRUN_PLUGIN_EOF_2'\n"));
    assert!(command.contains("echo end\nSCREENRUN_PLUGIN_EOF_2\nchmod +x"));
    assert_eq!(
        command
            .lines()
            .filter(|l| *l == "SCREENRUN_PLUGIN_EOF_2")
            .count(),
        1
    );
}

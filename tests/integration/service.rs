// tests/integration/service.rs

use std::sync::Arc;
use std::time::Duration;

use screenrun::config::ConfigFile;
use screenrun::engine::{LogKind, PluginRequest, PluginService, RunEvent, StreamMessage, stream_messages};
use screenrun::errors::ScreenrunError;
use screenrun::fs::mock::MockFileSystem;
use screenrun::plugin::ContentEntry;
use screenrun_test_utils::builders::ConfigFileBuilder;
use screenrun_test_utils::{FakeChannel, init_tracing, with_timeout};
use tokio_stream::StreamExt;

use crate::common::{NET_PLUGIN, TestResult};

fn service_with(config: ConfigFile) -> (PluginService, MockFileSystem) {
    let fs = MockFileSystem::new();
    fs.add_file("custom_plugins/net.sh", NET_PLUGIN);
    (PluginService::new(config, Arc::new(fs.clone())), fs)
}

fn service() -> PluginService {
    service_with(ConfigFile::default()).0
}

#[tokio::test]
async fn execute_with_resolves_named_plugin() {
    init_tracing();

    let mut channel = FakeChannel::new().respond_stdout(&["lo", "eth0"]);
    let outcome = service().execute_with("net.sh", &mut channel).await;

    let doc = outcome.document().expect("run should complete");
    assert_eq!(
        doc.screens()[0].content(),
        &[ContentEntry::text("lo"), ContentEntry::text("eth0")]
    );
}

#[tokio::test]
async fn missing_plugin_fails_before_any_channel_use() {
    init_tracing();

    let mut channel = FakeChannel::new();
    let record = channel.record();
    let outcome = service().execute_with("ghost", &mut channel).await;

    assert!(matches!(outcome.error(), Some(ScreenrunError::PluginNotFound(name)) if name == "ghost"));
    assert_eq!(outcome.logs().len(), 1);
    assert_eq!(outcome.logs()[0].kind, LogKind::Error);

    let record = record.lock().unwrap();
    assert_eq!(record.opens, 0);
    assert_eq!(record.closes, 0);
}

#[tokio::test]
async fn streaming_missing_plugin_yields_error_then_finished() {
    init_tracing();

    let events: Vec<RunEvent> = with_timeout(
        service()
            .execute_streaming_with("ghost", FakeChannel::new())
            .collect(),
    )
    .await;

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], RunEvent::Log(entry) if entry.kind == LogKind::Error));
    assert!(matches!(
        &events[1],
        RunEvent::Finished(Err(ScreenrunError::PluginNotFound(_)))
    ));
}

#[tokio::test]
async fn stream_messages_use_log_and_done_shapes() -> TestResult {
    init_tracing();

    let events = service().execute_streaming_with("net", FakeChannel::new().respond_stdout(&["eth0"]));
    let messages: Vec<StreamMessage> = with_timeout(stream_messages(events).collect()).await;

    let (last, logs) = messages.split_last().expect("at least one message");
    assert_eq!(last, &StreamMessage::Done { done: true });
    assert!(logs.contains(&StreamMessage::Log {
        log: "[stdout] eth0".to_string()
    }));

    assert_eq!(serde_json::to_string(last)?, r#"{"done":true}"#);
    assert_eq!(
        serde_json::to_string(&StreamMessage::Log { log: "hi".into() })?,
        r#"{"log":"hi"}"#
    );
    Ok(())
}

#[test]
fn snapshot_is_skipped_without_output_dir() -> TestResult {
    let (service, fs) = service_with(ConfigFile::default());
    let doc = service.load_document("net")?;

    assert_eq!(service.save_snapshot("net", &doc)?, None);
    assert_eq!(fs.files().len(), 1);
    Ok(())
}

#[test]
fn snapshot_is_written_to_output_dir() -> TestResult {
    let (service, fs) = service_with(ConfigFileBuilder::new().output_dir("plugin_json").build());
    let doc = service.load_document("net.sh")?;

    let path = service.save_snapshot("net.sh", &doc)?.expect("snapshot path");
    assert!(path.starts_with("plugin_json"));

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(name.starts_with("net_"), "unexpected file name {name}");
    assert!(name.ends_with(".json"));
    assert!(fs.contents(&path).is_some());
    Ok(())
}

#[test]
fn list_plugins_reads_configured_directory() -> TestResult {
    let (service, fs) = service_with(ConfigFile::default());
    fs.add_file("custom_plugins/disk.sh", "");
    assert_eq!(service.list_plugins()?, vec!["disk", "net"]);
    Ok(())
}

#[test]
fn request_accepts_socket_field_names_and_hides_secret() -> TestResult {
    let request: PluginRequest = serde_json::from_str(
        r#"{"script_name": "net", "resource_ip": "10.0.0.5", "username": "admin", "password": "hunter2"}"#,
    )?;

    assert_eq!(request.plugin_name, "net");
    assert_eq!(request.target_host, "10.0.0.5");
    assert_eq!(request.secret, "hunter2");
    assert_eq!(request.timeout, None);

    let debug = format!("{request:?}");
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("<redacted>"));
    Ok(())
}

#[tokio::test]
async fn unreachable_host_fails_with_connection_error() {
    init_tracing();

    let config = ConfigFileBuilder::new().port(1).connect_timeout("2s").build();
    let (service, _) = service_with(config);
    let request = PluginRequest {
        plugin_name: "net".to_string(),
        target_host: "127.0.0.1".to_string(),
        username: "nobody".to_string(),
        secret: "secret".to_string(),
        timeout: Some(Duration::from_secs(2)),
    };

    let outcome = tokio::time::timeout(Duration::from_secs(10), service.execute(&request))
        .await
        .expect("connection attempt should give up");

    match outcome.error() {
        Some(ScreenrunError::ConnectionFailed { target, .. }) => {
            assert_eq!(target, "nobody@127.0.0.1:1");
        }
        other => panic!("expected ConnectionFailed, got {other:?}"),
    }
    assert!(outcome.document().is_none());
    assert!(outcome.logs().iter().any(|l| l.kind == LogKind::Error));
}

#[test]
fn request_timeout_overrides_configured_connect_timeout() -> TestResult {
    let service = service();
    let overridden: PluginRequest = serde_json::from_str(
        r#"{"plugin_name": "net", "target_host": "h", "username": "u", "secret": "s", "timeout": "3s"}"#,
    )?;
    let without: PluginRequest = serde_json::from_str(
        r#"{"plugin_name": "net", "target_host": "h", "username": "u", "secret": "s", "timeout": null}"#,
    )?;

    assert_eq!(overridden.timeout, Some(Duration::from_secs(3)));
    assert_eq!(
        service.remote_channel(&overridden).connect_timeout(),
        Duration::from_secs(3)
    );
    assert_eq!(
        service.remote_channel(&without).connect_timeout(),
        service.config().remote.connect_timeout
    );
    Ok(())
}

#[test]
fn request_timeout_must_be_a_positive_duration() {
    for bad in [r#""0s""#, r#""soon""#, "5"] {
        let json = format!(
            r#"{{"plugin_name": "net", "target_host": "h", "username": "u", "secret": "s", "timeout": {bad}}}"#
        );
        assert!(
            serde_json::from_str::<PluginRequest>(&json).is_err(),
            "{bad} should be rejected"
        );
    }
}

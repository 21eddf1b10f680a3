// tests/integration/plugin_store.rs

use std::path::PathBuf;
use std::sync::Arc;

use screenrun::errors::ScreenrunError;
use screenrun::fs::FileSystem;
use screenrun::fs::mock::MockFileSystem;
use screenrun::plugin::PluginStore;

use crate::common::{NET_PLUGIN, TestResult};

fn store(fs: &MockFileSystem) -> PluginStore {
    let fs: Arc<dyn FileSystem> = Arc::new(fs.clone());
    PluginStore::new(fs, "plugins", "sh")
}

#[test]
fn loads_plugin_with_or_without_extension() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("plugins/net.sh", NET_PLUGIN);
    let store = store(&fs);

    assert_eq!(store.load("net")?, NET_PLUGIN);
    assert_eq!(store.load("net.sh")?, NET_PLUGIN);
    assert_eq!(store.path_for("net.sh")?, PathBuf::from("plugins/net.sh"));
    Ok(())
}

#[test]
fn missing_plugin_is_not_found() {
    let fs = MockFileSystem::new();
    fs.add_dir("plugins");

    match store(&fs).load("ghost.sh") {
        Err(ScreenrunError::PluginNotFound(name)) => assert_eq!(name, "ghost"),
        other => panic!("expected PluginNotFound, got {other:?}"),
    }
}

#[test]
fn names_escaping_the_directory_are_not_found() {
    let fs = MockFileSystem::new();
    fs.add_file("secret.sh", "@-\n-@");
    let store = store(&fs);

    for name in ["../secret", "/etc/passwd", "a/b", "", ".."] {
        assert!(
            matches!(store.load(name), Err(ScreenrunError::PluginNotFound(_))),
            "{name:?} should be rejected"
        );
    }
}

#[test]
fn unreadable_plugin_is_reported_with_reason() {
    let fs = MockFileSystem::new();
    fs.add_unreadable_file("plugins/locked.sh");

    match store(&fs).load("locked") {
        Err(ScreenrunError::PluginUnreadable { name, reason }) => {
            assert_eq!(name, "locked");
            assert!(reason.contains("Permission denied"));
        }
        other => panic!("expected PluginUnreadable, got {other:?}"),
    }
}

#[test]
fn list_returns_sorted_plugin_names() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("plugins/zeta.sh", "");
    fs.add_file("plugins/alpha.sh", "");
    fs.add_file("plugins/readme.md", "");
    fs.add_file("plugins/nested/inner.sh", "");

    assert_eq!(store(&fs).list()?, vec!["alpha", "zeta"]);
    Ok(())
}

#[test]
fn list_of_missing_directory_is_empty() -> TestResult {
    let fs = MockFileSystem::new();
    assert!(store(&fs).list()?.is_empty());
    Ok(())
}

#[test]
fn real_filesystem_reads_plugins_from_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("disk.sh"), NET_PLUGIN)?;
    std::fs::write(dir.path().join("other.txt"), "")?;

    let store = PluginStore::new(Arc::new(screenrun::fs::RealFileSystem), dir.path(), "sh");
    assert_eq!(store.list()?, vec!["disk"]);
    assert_eq!(store.load("disk")?, NET_PLUGIN);
    Ok(())
}

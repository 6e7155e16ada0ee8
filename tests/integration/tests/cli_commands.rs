//! CLI command integration tests.
//!
//! Commands run in process against a temporary config file and queue
//! directory.

use std::path::{Path, PathBuf};

use clap::Parser;
use sathi_cli::{run, Cli};
use sathi_sms::{store, FilePendingStore, PendingSmsRecord};
use tempfile::TempDir;

fn write_config(dir: &Path, transport: &[&str]) -> PathBuf {
    let path = dir.join("sathi.json5");
    let config = serde_json::json!({
        "sms": { "transport_command": transport, "backoff_step_ms": 0 },
        "queue": { "dir": dir.join("queue") },
    });
    std::fs::write(&path, config.to_string()).unwrap();
    path
}

async fn sathi(config: &Path, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["sathi", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    run(Cli::try_parse_from(argv)?).await
}

async fn queued(dir: &Path) -> Vec<PendingSmsRecord> {
    store::load_queue(&FilePendingStore::new(dir.join("queue"))).await
}

#[tokio::test]
async fn test_version_command() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), &[]);
    assert!(sathi(&config, &["version"]).await.is_ok());
}

#[cfg(unix)]
#[tokio::test]
async fn test_send_failure_is_queued_then_processed() {
    let tmp = TempDir::new().unwrap();
    let failing = write_config(tmp.path(), &["false"]);

    let result = sathi(&failing, &["send", "Need help", "--to", "+8801711000000"]).await;
    assert!(result.is_err());
    assert_eq!(queued(tmp.path()).await.len(), 1);

    let working = write_config(tmp.path(), &["true"]);
    sathi(&working, &["queue", "process"]).await.unwrap();
    assert!(queued(tmp.path()).await.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_send_without_fallback_leaves_queue_alone() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), &["false"]);

    let result = sathi(
        &config,
        &["send", "Need help", "--to", "+8801711000000", "--no-fallback", "--max-retries", "1"],
    )
    .await;

    assert!(result.is_err());
    assert!(queued(tmp.path()).await.is_empty());
}

#[tokio::test]
async fn test_unconfigured_transport_is_unsupported() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), &[]);

    let result = sathi(&config, &["send", "Need help", "--to", "+8801711000000"]).await;

    assert!(result.is_err());
    assert!(queued(tmp.path()).await.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_queue_clear() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), &["false"]);
    let _ = sathi(&config, &["send", "Need help", "--to", "+1", "--to", "+2"]).await;
    assert_eq!(queued(tmp.path()).await.len(), 2);

    sathi(&config, &["queue", "clear"]).await.unwrap();

    assert!(queued(tmp.path()).await.is_empty());
    assert!(sathi(&config, &["queue", "list"]).await.is_ok());
}

#[tokio::test]
async fn test_alert_requires_profile() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), &[]);

    let result = sathi(&config, &["alert", "accident", "--lat", "23.8", "--lon", "90.4"]).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_config_set_then_get() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), &[]);

    sathi(&config, &["config", "set", "queue.interval_secs", "15"]).await.unwrap();
    sathi(&config, &["config", "get", "queue.interval_secs"]).await.unwrap();
    assert!(sathi(&config, &["config", "get", "queue.nope"]).await.is_err());

    let loaded = sathi_core::Config::load(&config).unwrap();
    assert_eq!(loaded.queue.interval_secs, 15);
    assert!(sathi(&config, &["config", "validate"]).await.is_ok());
}

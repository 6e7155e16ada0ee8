//! Pending queue lifecycle across process restarts.
//!
//! Every step builds a fresh dispatcher and file store over the same
//! directory, the way separate CLI invocations do.

use std::sync::Arc;
use std::time::Duration;

use sathi_integration_tests::{file_dispatcher, SwitchableTransport};
use sathi_sms::{store, FilePendingStore, PendingQueueProcessor, QueueWorker, SendOptions};
use tempfile::TempDir;

async fn queued(dir: &std::path::Path) -> Vec<sathi_sms::PendingSmsRecord> {
    store::load_queue(&FilePendingStore::new(dir)).await
}

#[tokio::test]
async fn test_offline_send_is_delivered_after_restart() {
    let tmp = TempDir::new().unwrap();
    let transport = SwitchableTransport::offline();

    let sent = file_dispatcher(transport.clone(), tmp.path())
        .send_silent_sms(
            ["+880 1711-000000", "+8801819000000"],
            "Help",
            SendOptions::default(),
        )
        .await;
    assert!(!sent);
    assert_eq!(transport.sends(), 6);

    let pending = queued(tmp.path()).await;
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].to, "+8801711000000");
    assert_eq!(pending[0].attempts, 0);
    assert_eq!(pending[0].last_error.as_deref(), Some("no service"));

    transport.set_online(true);
    let report = PendingQueueProcessor::new(file_dispatcher(transport.clone(), tmp.path()))
        .process()
        .await;

    assert_eq!(report.sent, 2);
    assert!(queued(tmp.path()).await.is_empty());
    let raw = std::fs::read_to_string(tmp.path().join("pendingSms.json")).unwrap();
    assert_eq!(raw.trim(), "[]");
}

#[tokio::test]
async fn test_record_expires_after_five_failed_cycles() {
    let tmp = TempDir::new().unwrap();
    let transport = SwitchableTransport::offline();

    file_dispatcher(transport.clone(), tmp.path())
        .send_silent_sms("+15551234567", "Help", SendOptions::default())
        .await;

    for cycle in 1..=4 {
        PendingQueueProcessor::new(file_dispatcher(transport.clone(), tmp.path()))
            .process()
            .await;
        let pending = queued(tmp.path()).await;
        assert_eq!(pending.len(), 1, "cycle {cycle}");
        assert_eq!(pending[0].attempts, cycle);
        assert!(pending[0].last_attempt.is_some());
    }

    let report = PendingQueueProcessor::new(file_dispatcher(transport.clone(), tmp.path()))
        .process()
        .await;
    assert_eq!(report.expired, 1);
    assert!(queued(tmp.path()).await.is_empty());
}

#[tokio::test]
async fn test_queue_file_written_by_other_tools_is_accepted() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("pendingSms.json"),
        r#"[{"to":"+15551234567","message":"Help","timestamp":"2024-01-01T00:00:00Z"}]"#,
    )
    .unwrap();
    let transport = SwitchableTransport::offline();
    transport.set_online(true);

    let report = PendingQueueProcessor::new(file_dispatcher(transport.clone(), tmp.path()))
        .process()
        .await;

    assert_eq!(report.sent, 1);
    assert_eq!(transport.sends(), 1);
}

#[tokio::test]
async fn test_corrupt_queue_file_is_replaced_on_next_park() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("pendingSms.json"), "not json at all").unwrap();
    let transport = SwitchableTransport::offline();

    file_dispatcher(transport.clone(), tmp.path())
        .send_silent_sms("+15551234567", "Help", SendOptions::default().with_max_retries(1))
        .await;

    assert_eq!(queued(tmp.path()).await.len(), 1);
}

/// Poll the queue file until `done` holds, failing after a generous deadline.
async fn wait_for_queue<F>(dir: &std::path::Path, done: F)
where
    F: Fn(&[sathi_sms::PendingSmsRecord]) -> bool,
{
    let polled = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if done(&queued(dir).await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "queue never reached the expected state");
}

#[tokio::test]
async fn test_worker_delivers_once_connectivity_returns() {
    let tmp = TempDir::new().unwrap();
    let transport = SwitchableTransport::offline();

    file_dispatcher(transport.clone(), tmp.path())
        .send_silent_sms("+15551234567", "Help", SendOptions::default().with_max_retries(1))
        .await;

    let processor = Arc::new(PendingQueueProcessor::new(file_dispatcher(transport.clone(), tmp.path())));
    let handle = QueueWorker::spawn(processor, Duration::from_millis(200));

    wait_for_queue(tmp.path(), |q| q.first().map_or(false, |r| r.attempts >= 1)).await;
    assert_eq!(queued(tmp.path()).await.len(), 1);

    let offline_sends = transport.sends();
    transport.set_online(true);
    wait_for_queue(tmp.path(), |q| q.is_empty()).await;
    handle.shutdown().await;

    assert!(transport.sends() > offline_sends);
}

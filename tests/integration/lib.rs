//! Shared helpers for the integration tests.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sathi_sms::platform::{StaticPermission, TracingNotifier};
use sathi_sms::{Dispatcher, DispatcherConfig, FilePendingStore, SmsError, SmsTransport};
use serde_json::Value;

/// Transport whose connectivity can be toggled.
#[derive(Default)]
pub struct SwitchableTransport {
    online: AtomicBool,
    sends: AtomicUsize,
}

impl SwitchableTransport {
    pub fn offline() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmsTransport for SwitchableTransport {
    async fn send(&self, _destination: &str, _message: &str) -> sathi_sms::Result<Value> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.online.load(Ordering::SeqCst) {
            Ok(serde_json::json!({ "success": true }))
        } else {
            Err(SmsError::transport("no service"))
        }
    }
}

/// Dispatcher over a file store in `dir`, as a fresh process would build it.
pub fn file_dispatcher(transport: Arc<SwitchableTransport>, dir: &Path) -> Arc<Dispatcher> {
    let dispatcher = Dispatcher::new(
        transport,
        Arc::new(StaticPermission(true)),
        Arc::new(TracingNotifier),
        Arc::new(FilePendingStore::new(dir)),
    )
    .with_config(DispatcherConfig {
        backoff_step: Duration::ZERO,
        attempt_timeout: Some(Duration::from_secs(5)),
    });
    Arc::new(dispatcher)
}

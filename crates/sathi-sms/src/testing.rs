//! Fakes for the injected collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::alert::{AlertError, Dialer, Location, Locator};
use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::store::MemoryPendingStore;
use crate::traits::{SendPermission, SmsTransport, UserNotifier};
use crate::{Result, SmsError};

/// One scripted transport response.
#[derive(Debug, Clone)]
pub enum Script {
    Reply(Value),
    Fail(String),
    Hang,
}

/// Transport that replays scripted responses and records every call.
pub struct FakeTransport {
    supported: bool,
    script: Mutex<VecDeque<Script>>,
    fallback: Script,
    calls: Mutex<Vec<(String, String, Instant)>>,
}

impl FakeTransport {
    pub fn always(fallback: Script) -> Self {
        Self {
            supported: true,
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::always(Script::Reply(Value::Bool(true)))
    }

    pub fn failing() -> Self {
        Self::always(Script::Fail("SMS_FAILED".into()))
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::succeeding()
        }
    }

    /// Responses consumed in order before falling back.
    pub fn then(self, steps: impl IntoIterator<Item = Script>) -> Self {
        self.script.lock().unwrap().extend(steps);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(to, msg, _)| (to.clone(), msg.clone()))
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Gaps between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1].2 - w[0].2).collect()
    }
}

#[async_trait]
impl SmsTransport for FakeTransport {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn send(&self, destination: &str, message: &str) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((destination.to_string(), message.to_string(), Instant::now()));

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match step {
            Script::Reply(value) => Ok(value),
            Script::Fail(reason) => Err(SmsError::transport(reason)),
            Script::Hang => std::future::pending().await,
        }
    }
}

/// Permission that answers with a fixed value and counts prompts.
pub struct FakePermission {
    granted: bool,
    prompts: AtomicUsize,
}

impl FakePermission {
    pub fn new(granted: bool) -> Self {
        Self {
            granted,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SendPermission for FakePermission {
    async fn ensure_granted(&self) -> bool {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.granted
    }
}

/// Notifier that remembers every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.notices.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }
}

impl UserNotifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

/// Locator with a fixed answer.
pub struct FakeLocator(pub std::result::Result<Location, String>);

#[async_trait]
impl Locator for FakeLocator {
    async fn current_location(&self) -> std::result::Result<Location, AlertError> {
        self.0.clone().map_err(AlertError::Location)
    }
}

/// Dialer that records dialed numbers.
pub struct FakeDialer {
    pub permitted: bool,
    pub dialed: Mutex<Vec<(String, Instant)>>,
}

impl FakeDialer {
    pub fn new(permitted: bool) -> Self {
        Self {
            permitted,
            dialed: Mutex::new(Vec::new()),
        }
    }

    pub fn numbers(&self) -> Vec<String> {
        self.dialed.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }
}

#[async_trait]
impl Dialer for FakeDialer {
    async fn ensure_call_permission(&self) -> bool {
        self.permitted
    }

    async fn dial(&self, number: &str) -> std::result::Result<(), AlertError> {
        self.dialed
            .lock()
            .unwrap()
            .push((number.to_string(), Instant::now()));
        Ok(())
    }
}

/// A dispatcher wired to fakes, with handles to inspect them.
pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub permission: Arc<FakePermission>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<MemoryPendingStore>,
    pub dispatcher: Arc<Dispatcher>,
}

impl Harness {
    pub fn new(transport: FakeTransport, granted: bool) -> Self {
        Self::with_store(transport, granted, MemoryPendingStore::new())
    }

    pub fn with_store(transport: FakeTransport, granted: bool, store: MemoryPendingStore) -> Self {
        let transport = Arc::new(transport);
        let permission = Arc::new(FakePermission::new(granted));
        let notifier = Arc::new(RecordingNotifier::default());
        let store = Arc::new(store);
        let dispatcher = Arc::new(
            Dispatcher::new(
                transport.clone(),
                permission.clone(),
                notifier.clone(),
                store.clone(),
            )
            .with_config(DispatcherConfig::default()),
        );
        Self {
            transport,
            permission,
            notifier,
            store,
            dispatcher,
        }
    }

    pub async fn queue(&self) -> Vec<crate::PendingSmsRecord> {
        crate::store::load_queue(self.store.as_ref()).await
    }
}

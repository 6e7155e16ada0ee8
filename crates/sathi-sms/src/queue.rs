//! Pending queue processing.
//!
//! # Single writer
//!
//! The queue is stored as one serialized collection and every access is a
//! full read-modify-write without locking. Only one task may touch the store
//! at a time: run [`PendingQueueProcessor::process`] from a single trigger
//! that never overlaps itself (see [`crate::worker::QueueWorker`]), and do not
//! run fallback dispatches concurrently with it.

use std::sync::Arc;

use sathi_core::phone;
use tracing::{debug, error, info, warn};

use crate::dispatcher::{Dispatcher, SendOptions};
use crate::store;
use crate::traits::PendingStore;

/// Limits applied while draining the queue.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Per-recipient attempt budget for each re-send.
    pub max_retries: u32,

    /// Failed processing cycles after which a record is discarded.
    pub lifetime_attempt_cap: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            lifetime_attempt_cap: 5,
        }
    }
}

impl From<&sathi_core::Config> for ProcessorConfig {
    fn from(config: &sathi_core::Config) -> Self {
        Self {
            max_retries: config.queue.process_max_retries,
            lifetime_attempt_cap: config.queue.lifetime_attempt_cap,
        }
    }
}

/// Counts from one processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Records delivered and removed.
    pub sent: usize,

    /// Records that failed and stay queued.
    pub retained: usize,

    /// Records discarded at the lifetime cap.
    pub expired: usize,

    /// Records discarded because their destination is not a phone number.
    pub invalid: usize,
}

impl ProcessReport {
    /// Records examined in this run.
    pub fn total(&self) -> usize {
        self.sent + self.retained + self.expired + self.invalid
    }
}

/// Drains the durable pending queue through the dispatcher.
pub struct PendingQueueProcessor {
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn PendingStore>,
    config: ProcessorConfig,
}

impl PendingQueueProcessor {
    /// Create a processor sharing the dispatcher's store.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        let store = dispatcher.store();
        Self {
            dispatcher,
            store,
            config: ProcessorConfig::default(),
        }
    }

    /// Replace the processing limits.
    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Re-attempt every pending record once and rewrite the queue.
    ///
    /// Never fails. An empty or absent queue is left untouched; otherwise the
    /// rewritten queue is stored even when nothing changed, so expired and
    /// invalid records are really discarded.
    pub async fn process(&self) -> ProcessReport {
        let records = store::load_queue(self.store.as_ref()).await;
        let mut report = ProcessReport::default();
        if records.is_empty() {
            debug!("Pending SMS queue is empty");
            return report;
        }

        let cap = self.config.lifetime_attempt_cap;
        let options = SendOptions::without_fallback().with_max_retries(self.config.max_retries);
        let mut kept = Vec::with_capacity(records.len());

        for mut record in records {
            let Some(to) = phone::normalize(&record.to) else {
                warn!(to = %record.to, "Dropping pending SMS with invalid destination");
                report.invalid += 1;
                continue;
            };
            record.to = to;

            if record.attempts >= cap {
                info!(to = %record.to, attempts = record.attempts, "Dropping expired pending SMS");
                report.expired += 1;
                continue;
            }

            let outcome = self.dispatcher.dispatch(record.to.as_str(), &record.message, options).await;
            if outcome.all_sent() {
                debug!(to = %record.to, "Pending SMS delivered");
                report.sent += 1;
                continue;
            }

            record.mark_failed(outcome.failure_reason());
            if record.attempts >= cap {
                info!(
                    to = %record.to,
                    attempts = record.attempts,
                    last_error = ?record.last_error,
                    "Pending SMS reached its attempt cap, dropping"
                );
                report.expired += 1;
                continue;
            }

            report.retained += 1;
            kept.push(record);
        }

        if let Err(e) = store::replace_queue(self.store.as_ref(), &kept).await {
            error!("Failed to rewrite pending SMS queue: {}", e);
        }

        info!(
            sent = report.sent,
            retained = report.retained,
            expired = report.expired,
            invalid = report.invalid,
            "Processed pending SMS queue"
        );
        report
    }
}

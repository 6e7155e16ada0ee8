//! Silent SMS dispatch.
//!
//! A dispatch call checks the platform, passes the permission gate, then
//! walks its recipients in order. Each recipient gets a bounded number of
//! transport attempts separated by a linear backoff (`step * attempt`).
//! Recipients that exhaust their budget are parked in the pending queue when
//! the call allows fallback.

use std::sync::Arc;
use std::time::Duration;

use sathi_core::phone;
use tracing::{debug, error, info, warn};

use crate::record::PendingSmsRecord;
use crate::reply;
use crate::store;
use crate::traits::{PendingStore, SendPermission, SmsTransport, UserNotifier};
use crate::SmsError;

/// Timing configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Backoff step; attempt `n` waits `n * step` before attempt `n + 1`.
    pub backoff_step: Duration,

    /// Upper bound for a single transport call. `None` waits indefinitely.
    pub attempt_timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            backoff_step: Duration::from_millis(300),
            attempt_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl From<&sathi_core::Config> for DispatcherConfig {
    fn from(config: &sathi_core::Config) -> Self {
        Self {
            backoff_step: config.backoff_step(),
            attempt_timeout: config.attempt_timeout(),
        }
    }
}

/// Per-call send options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// Park undelivered recipients in the pending queue.
    pub allow_fallback: bool,

    /// Per-recipient attempt budget for this call. Zero is treated as one.
    pub max_retries: u32,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            allow_fallback: true,
            max_retries: 3,
        }
    }
}

impl SendOptions {
    /// Options that never touch the pending queue.
    pub fn without_fallback() -> Self {
        Self {
            allow_fallback: false,
            ..Self::default()
        }
    }

    /// Set the per-recipient attempt budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn attempt_budget(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Wait after failed attempt `attempt`, saturating instead of overflowing.
fn backoff_delay(step: Duration, attempt: u32) -> Duration {
    step.checked_mul(attempt).unwrap_or(Duration::MAX)
}

/// Ordered destinations of one send request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients(Vec<String>);

impl Recipients {
    /// Raw destinations in request order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Whether the request names no destination.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Recipients {
    fn from(to: &str) -> Self {
        Self(vec![to.to_string()])
    }
}

impl From<String> for Recipients {
    fn from(to: String) -> Self {
        Self(vec![to])
    }
}

impl From<Vec<String>> for Recipients {
    fn from(to: Vec<String>) -> Self {
        Self(to)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(to: Vec<&str>) -> Self {
        Self(to.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for Recipients {
    fn from(to: &[String]) -> Self {
        Self(to.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Recipients {
    fn from(to: [&str; N]) -> Self {
        Self(to.iter().map(|s| s.to_string()).collect())
    }
}

/// What happened to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Delivered after the given number of attempts.
    Sent { attempts: u32 },

    /// Not delivered. `queued` tells whether a pending record was written.
    Failed { reason: String, queued: bool },

    /// Destination did not normalize to a phone number.
    Invalid,
}

/// Outcome for one requested destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientOutcome {
    /// Destination as given by the caller.
    pub raw: String,

    /// Normalized destination, if any.
    pub normalized: Option<String>,

    /// Result for this destination.
    pub outcome: DeliveryOutcome,
}

/// Outcome of one dispatch call.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Per-recipient outcomes in request order.
    pub recipients: Vec<RecipientOutcome>,

    /// Set when the call stopped before any transport attempt.
    pub aborted: Option<String>,
}

impl DispatchReport {
    /// True only when the call ran and every destination was delivered.
    pub fn all_sent(&self) -> bool {
        self.aborted.is_none()
            && self
                .recipients
                .iter()
                .all(|r| matches!(r.outcome, DeliveryOutcome::Sent { .. }))
    }

    /// Number of delivered destinations.
    pub fn sent_count(&self) -> usize {
        self.recipients
            .iter()
            .filter(|r| matches!(r.outcome, DeliveryOutcome::Sent { .. }))
            .count()
    }

    /// Number of pending records written by this call.
    pub fn queued_count(&self) -> usize {
        self.recipients
            .iter()
            .filter(|r| matches!(r.outcome, DeliveryOutcome::Failed { queued: true, .. }))
            .count()
    }

    /// First failure reason, if any destination failed.
    pub fn failure_reason(&self) -> Option<String> {
        self.recipients
            .iter()
            .find_map(|r| match &r.outcome {
                DeliveryOutcome::Failed { reason, .. } => Some(reason.clone()),
                DeliveryOutcome::Invalid => Some("invalid_recipient".to_string()),
                DeliveryOutcome::Sent { .. } => None,
            })
            .or_else(|| self.aborted.clone())
    }
}

/// Sends silent SMS through the injected transport.
pub struct Dispatcher {
    transport: Arc<dyn SmsTransport>,
    permission: Arc<dyn SendPermission>,
    notifier: Arc<dyn UserNotifier>,
    store: Arc<dyn PendingStore>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher with default timing.
    pub fn new(
        transport: Arc<dyn SmsTransport>,
        permission: Arc<dyn SendPermission>,
        notifier: Arc<dyn UserNotifier>,
        store: Arc<dyn PendingStore>,
    ) -> Self {
        Self {
            transport,
            permission,
            notifier,
            store,
            config: DispatcherConfig::default(),
        }
    }

    /// Replace the timing configuration.
    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Pending store used for fallback.
    pub fn store(&self) -> Arc<dyn PendingStore> {
        self.store.clone()
    }

    /// Notifier used for hard-failure notices.
    pub fn notifier(&self) -> Arc<dyn UserNotifier> {
        self.notifier.clone()
    }

    /// Send `message` to every destination.
    ///
    /// Returns true only when every destination was valid and delivered.
    /// Never fails: errors are absorbed per attempt and per recipient.
    pub async fn send_silent_sms(
        &self,
        to: impl Into<Recipients>,
        message: &str,
        options: SendOptions,
    ) -> bool {
        self.dispatch(to, message, options).await.all_sent()
    }

    /// Send `message` to every destination and report per-recipient outcomes.
    pub async fn dispatch(
        &self,
        to: impl Into<Recipients>,
        message: &str,
        options: SendOptions,
    ) -> DispatchReport {
        let recipients = to.into();

        if !self.transport.is_supported() {
            warn!("Silent SMS requested on an unsupported platform");
            self.notifier
                .notify("Unsupported", "Silent SMS is only supported on Android");
            return Self::abort(&recipients, SmsError::Unsupported, false);
        }

        if !self.permission.ensure_granted().await {
            warn!(
                recipients = recipients.as_slice().len(),
                fallback = options.allow_fallback,
                "SMS permission denied"
            );
            let queued = if options.allow_fallback {
                let records = recipients
                    .as_slice()
                    .iter()
                    .filter_map(|raw| phone::normalize(raw))
                    .map(|to| {
                        PendingSmsRecord::new(to, message, Some(SmsError::PermissionDenied.reason()))
                    })
                    .collect();
                self.park(records).await
            } else {
                false
            };
            self.notifier
                .notify("Permission Denied", "Cannot send SMS without permission.");
            return Self::abort(&recipients, SmsError::PermissionDenied, queued);
        }

        let budget = options.attempt_budget();
        let mut report = DispatchReport::default();

        for raw in recipients.as_slice() {
            let Some(to) = phone::normalize(raw) else {
                warn!(raw = %raw, "Skipping destination that is not a phone number");
                report.recipients.push(RecipientOutcome {
                    raw: raw.clone(),
                    normalized: None,
                    outcome: DeliveryOutcome::Invalid,
                });
                continue;
            };

            let outcome = match self.send_with_retry(&to, message, budget).await {
                Ok(attempts) => DeliveryOutcome::Sent { attempts },
                Err(e) => {
                    let reason = e.reason();
                    let queued = options.allow_fallback
                        && self
                            .park(vec![PendingSmsRecord::new(
                                to.clone(),
                                message,
                                Some(reason.clone()),
                            )])
                            .await;
                    DeliveryOutcome::Failed { reason, queued }
                }
            };

            report.recipients.push(RecipientOutcome {
                raw: raw.clone(),
                normalized: Some(to),
                outcome,
            });
        }

        info!(
            total = report.recipients.len(),
            sent = report.sent_count(),
            queued = report.queued_count(),
            "SMS dispatch finished"
        );
        report
    }

    /// Try one destination up to `budget` times. Returns the attempt that succeeded.
    async fn send_with_retry(&self, to: &str, message: &str, budget: u32) -> Result<u32, SmsError> {
        let mut last_error = None;

        for attempt in 1..=budget {
            match self.attempt(to, message).await {
                Ok(()) => {
                    debug!(to, attempt, "SMS sent");
                    return Ok(attempt);
                }
                Err(e) => {
                    warn!(to, attempt, budget, "SMS attempt failed: {}", e);
                    last_error = Some(e);
                    if attempt < budget {
                        tokio::time::sleep(backoff_delay(self.config.backoff_step, attempt)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SmsError::transport("no attempt made")))
    }

    async fn attempt(&self, to: &str, message: &str) -> Result<(), SmsError> {
        let send = self.transport.send(to, message);
        let reply = match self.config.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| SmsError::Timeout)??,
            None => send.await?,
        };

        if reply::is_accepted(&reply) {
            Ok(())
        } else {
            Err(SmsError::Rejected(reply::rejection_reason(&reply)))
        }
    }

    /// Append records to the pending queue. Returns whether they were stored.
    async fn park(&self, records: Vec<PendingSmsRecord>) -> bool {
        let count = records.len();
        if count == 0 {
            return false;
        }
        match store::append_to_queue(self.store.as_ref(), records).await {
            Ok(()) => {
                info!(count, "Queued undelivered SMS for retry");
                true
            }
            Err(e) => {
                error!(count, "Failed to queue undelivered SMS: {}", e);
                false
            }
        }
    }

    fn abort(recipients: &Recipients, cause: SmsError, queued: bool) -> DispatchReport {
        let reason = cause.reason();
        let outcomes = recipients
            .as_slice()
            .iter()
            .map(|raw| {
                let normalized = phone::normalize(raw);
                let outcome = match normalized {
                    Some(_) => DeliveryOutcome::Failed {
                        reason: reason.clone(),
                        queued,
                    },
                    None => DeliveryOutcome::Invalid,
                };
                RecipientOutcome {
                    raw: raw.clone(),
                    normalized,
                    outcome,
                }
            })
            .collect();

        DispatchReport {
            recipients: outcomes,
            aborted: Some(reason),
        }
    }
}

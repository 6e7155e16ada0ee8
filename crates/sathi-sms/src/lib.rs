//! Silent SMS dispatch for Sathi.
//!
//! This crate sends emergency text messages through an injected platform
//! transport, retries each recipient with linear backoff, and parks messages
//! that could not be delivered in a durable pending queue that is drained
//! later by [`PendingQueueProcessor`].

/// Emergency alert composition and orchestration.
pub mod alert;
/// Per-call dispatch with permission gate and bounded retry.
pub mod dispatcher;
/// Error types.
pub mod error;
/// Host collaborators backed by external commands.
pub mod platform;
/// Pending queue draining.
pub mod queue;
/// Durable pending record model and JSON codec.
pub mod record;
/// Transport reply interpretation.
pub mod reply;
/// Pending store backends.
pub mod store;
/// Injected collaborator traits.
pub mod traits;
/// Background queue processing.
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use alert::{AlertError, AlertKind, AlertReport, Dialer, EmergencyAlert, Location, Locator};
pub use dispatcher::{
    DeliveryOutcome, DispatchReport, Dispatcher, DispatcherConfig, RecipientOutcome, Recipients,
    SendOptions,
};
pub use error::SmsError;
pub use queue::{PendingQueueProcessor, ProcessReport, ProcessorConfig};
pub use record::PendingSmsRecord;
pub use store::{FilePendingStore, MemoryPendingStore, PENDING_SMS_KEY};
pub use traits::{PendingStore, SendPermission, SmsTransport, UserNotifier};
pub use worker::{QueueWorker, QueueWorkerHandle};

/// Result type for SMS operations.
pub type Result<T> = std::result::Result<T, SmsError>;

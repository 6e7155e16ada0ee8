//! Collaborators injected into the dispatcher and queue processor.
//!
//! The host platform supplies the actual SMS primitive, the permission
//! prompt, user-visible notices, and the disk-backed key-value store.

use crate::Result;
use async_trait::async_trait;

/// Platform capability that transmits one text message to one destination.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Whether this platform can send SMS at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Attempt to send `message` to `destination`.
    ///
    /// The reply shape is platform dependent; see [`crate::reply::is_accepted`]
    /// for how it is interpreted.
    async fn send(&self, destination: &str, message: &str) -> Result<serde_json::Value>;
}

/// SMS send permission.
#[async_trait]
pub trait SendPermission: Send + Sync {
    /// Return whether permission is granted, prompting at most once.
    async fn ensure_granted(&self) -> bool;
}

/// Channel for user-visible notices on hard failures.
pub trait UserNotifier: Send + Sync {
    /// Show a notice to the user.
    fn notify(&self, title: &str, message: &str);
}

/// Durable string store holding the serialized pending queue.
///
/// The whole collection is read and replaced on every access. Implementations
/// do not lock; callers serialize access.
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Read the serialized queue, `None` when nothing was ever written.
    async fn read_all(&self) -> Result<Option<String>>;

    /// Replace the serialized queue.
    async fn write_all(&self, serialized: &str) -> Result<()>;
}

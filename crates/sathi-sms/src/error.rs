//! SMS error types.

use std::io;
use thiserror::Error;

/// Errors that can occur while sending or queueing SMS messages.
#[derive(Debug, Error)]
pub enum SmsError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host platform cannot send SMS.
    #[error("Silent SMS is not supported on this platform")]
    Unsupported,

    /// Send permission was not granted.
    #[error("SMS permission denied")]
    PermissionDenied,

    /// Destination did not normalize to a phone number.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Transport raised an error.
    #[error("Transport failed: {0}")]
    Transport(String),

    /// Transport replied with an error field.
    #[error("Transport rejected message: {0}")]
    Rejected(String),

    /// A single attempt exceeded its time limit.
    #[error("Send attempt timed out")]
    Timeout,
}

impl SmsError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Short failure reason recorded on pending records.
    pub fn reason(&self) -> String {
        match self {
            Self::Unsupported => "unsupported".to_string(),
            Self::PermissionDenied => "permission_denied".to_string(),
            Self::Timeout => "timeout".to_string(),
            Self::Transport(message) | Self::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

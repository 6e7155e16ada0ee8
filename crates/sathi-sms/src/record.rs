//! Pending SMS records and their on-disk form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One durable retry-queue entry.
///
/// `attempts` counts processing cycles, not the immediate retries of a single
/// dispatch call. It is only ever incremented by the queue processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSmsRecord {
    /// Normalized destination.
    pub to: String,

    /// Fully rendered message body.
    pub message: String,

    /// Processing cycles that failed for this record.
    #[serde(default)]
    pub attempts: u32,

    /// Most recent failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Time of the most recent processing cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,

    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl PendingSmsRecord {
    /// Create a fresh record for a normalized destination.
    pub fn new(to: impl Into<String>, message: impl Into<String>, last_error: Option<String>) -> Self {
        Self {
            to: to.into(),
            message: message.into(),
            attempts: 0,
            last_error,
            last_attempt: None,
            timestamp: Utc::now(),
        }
    }

    /// Record a failed processing cycle.
    pub fn mark_failed(&mut self, reason: Option<String>) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_attempt = Some(Utc::now());
        if reason.is_some() {
            self.last_error = reason;
        }
    }
}

/// Decode a serialized queue.
///
/// Fails only when the content is not a JSON array. Entries that do not
/// decode as records are skipped with a warning; the rest are kept in order.
pub fn decode_queue(content: &str) -> serde_json::Result<Vec<PendingSmsRecord>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<Value> = serde_json::from_str(content)?;
    let total = entries.len();

    let records: Vec<PendingSmsRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, "Skipping undecodable pending SMS entry: {}", e);
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(kept = records.len(), total, "Pending SMS queue had undecodable entries");
    }
    Ok(records)
}

/// Encode a queue for storage.
pub fn encode_queue(records: &[PendingSmsRecord]) -> serde_json::Result<String> {
    serde_json::to_string(records)
}

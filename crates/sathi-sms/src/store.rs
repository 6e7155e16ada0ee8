//! Pending store backends and whole-queue helpers.
//!
//! [`FilePendingStore`] keeps the serialized queue in a single JSON file under
//! `{dir}/pendingSms.json`. [`MemoryPendingStore`] keeps it in process.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::record::{self, PendingSmsRecord};
use crate::traits::PendingStore;
use crate::{Result, SmsError};

/// Well-known key of the pending SMS queue.
pub const PENDING_SMS_KEY: &str = "pendingSms";

/// A file-system-backed pending store.
#[derive(Debug, Clone)]
pub struct FilePendingStore {
    path: PathBuf,
}

impl FilePendingStore {
    /// Create a store keeping its file inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{PENDING_SMS_KEY}.json")),
        }
    }

    /// Path of the queue file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PendingStore for FilePendingStore {
    async fn read_all(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, serialized: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write atomically
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, serialized).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&temp_path, perms).await?;
        }

        tokio::fs::rename(&temp_path, &self.path).await?;
        debug!(path = %self.path.display(), bytes = serialized.len(), "wrote pending queue");
        Ok(())
    }
}

/// An in-process pending store.
#[derive(Debug, Default)]
pub struct MemoryPendingStore {
    content: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryPendingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `content`.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(Some(content.into())),
            writes: AtomicUsize::new(0),
        }
    }

    /// Current raw content.
    pub async fn content(&self) -> Option<String> {
        self.content.lock().await.clone()
    }

    /// Number of `write_all` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PendingStore for MemoryPendingStore {
    async fn read_all(&self) -> Result<Option<String>> {
        Ok(self.content.lock().await.clone())
    }

    async fn write_all(&self, serialized: &str) -> Result<()> {
        *self.content.lock().await = Some(serialized.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Load the whole queue.
///
/// Absent, unreadable, or non-array content is an empty queue. Entries that
/// do not decode are skipped, so valid records survive the next rewrite.
pub async fn load_queue(store: &dyn PendingStore) -> Vec<PendingSmsRecord> {
    let content = match store.read_all().await {
        Ok(Some(content)) => content,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Could not read pending SMS queue, treating as empty: {}", e);
            return Vec::new();
        }
    };

    match record::decode_queue(&content) {
        Ok(records) => records,
        Err(e) => {
            warn!("Pending SMS queue is corrupt, treating as empty: {}", e);
            Vec::new()
        }
    }
}

/// Replace the whole queue.
pub async fn replace_queue(store: &dyn PendingStore, records: &[PendingSmsRecord]) -> Result<()> {
    let serialized = record::encode_queue(records)?;
    store.write_all(&serialized).await
}

/// Append records to the queue with one read-modify-write.
pub async fn append_to_queue(
    store: &dyn PendingStore,
    records: Vec<PendingSmsRecord>,
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    if let Some(bad) = records.iter().find(|r| r.to.is_empty()) {
        return Err(SmsError::InvalidRecipient(bad.to.clone()));
    }

    let mut queue = load_queue(store).await;
    queue.extend(records);
    replace_queue(store, &queue).await
}

//! Background queue draining.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::queue::PendingQueueProcessor;

/// Runs [`PendingQueueProcessor::process`] periodically from a single task.
pub struct QueueWorker;

impl QueueWorker {
    /// Spawn the worker. The first run happens immediately.
    ///
    /// Runs never overlap: a run that outlasts the interval causes the
    /// missed ticks to be skipped.
    pub fn spawn(processor: Arc<PendingQueueProcessor>, interval: Duration) -> QueueWorkerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let period = interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            info!(interval_ms = period.as_millis() as u64, "Starting pending SMS worker");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Pending SMS worker shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let report = processor.process().await;
                        debug!(total = report.total(), "Pending SMS worker cycle done");
                    }
                }
            }
        });

        QueueWorkerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running [`QueueWorker`].
pub struct QueueWorkerHandle {
    shutdown: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl QueueWorkerHandle {
    /// Stop the worker, letting an in-flight run finish first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(()).await;
        if let Err(e) = self.task.await {
            warn!("Pending SMS worker ended abnormally: {}", e);
        }
    }

    /// Whether the worker task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

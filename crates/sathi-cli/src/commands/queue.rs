//! Pending queue commands.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use sathi_sms::{store, PendingQueueProcessor, PendingSmsRecord, ProcessorConfig, QueueWorker};
use tracing::info;

/// Queue command arguments.
#[derive(Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommand,
}

#[derive(clap::Subcommand)]
pub enum QueueCommand {
    /// List pending messages
    List,

    /// Re-attempt every pending message once
    Process,

    /// Keep draining the queue until interrupted
    ///
    /// The pending queue has a single writer. While this runs, do not use
    /// `sathi send` or `sathi alert` from another process, since their
    /// undelivered messages may be overwritten.
    Watch {
        /// Seconds between runs (defaults to queue.interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Discard every pending message
    Clear,
}

/// Run the queue command.
pub async fn run(args: QueueArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    match args.command {
        QueueCommand::List => {
            let store = super::open_store(&config)?;
            let records = store::load_queue(store.as_ref()).await;
            if records.is_empty() {
                println!("No pending messages");
            } else {
                for line in format_records(&records) {
                    println!("{}", line);
                }
            }
        }

        QueueCommand::Process => {
            let processor = processor(&config)?;
            let report = processor.process().await;
            println!(
                "Processed {} message(s): {} sent, {} retained, {} expired, {} invalid",
                report.total(),
                report.sent,
                report.retained,
                report.expired,
                report.invalid
            );
        }

        QueueCommand::Watch { interval } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.queue_interval());
            let processor = Arc::new(processor(&config)?);

            let handle = QueueWorker::spawn(processor, interval);
            println!("Watching pending queue every {}s, press Ctrl-C to stop", interval.as_secs());

            tokio::signal::ctrl_c().await?;
            info!("Interrupt received");
            handle.shutdown().await;
        }

        QueueCommand::Clear => {
            let store = super::open_store(&config)?;
            let count = store::load_queue(store.as_ref()).await.len();
            store::replace_queue(store.as_ref(), &[]).await?;
            println!("Discarded {} pending message(s)", count);
        }
    }

    Ok(())
}

fn processor(config: &sathi_core::Config) -> anyhow::Result<PendingQueueProcessor> {
    let dispatcher = super::build_dispatcher(config)?;
    Ok(PendingQueueProcessor::new(dispatcher).with_config(ProcessorConfig::from(config)))
}

/// One display line per record.
pub fn format_records(records: &[PendingSmsRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| {
            format!(
                "{:<18} attempts={} queued={} last_error={} {:?}",
                r.to,
                r.attempts,
                r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                r.last_error.as_deref().unwrap_or("-"),
                truncate(&r.message, 40)
            )
        })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

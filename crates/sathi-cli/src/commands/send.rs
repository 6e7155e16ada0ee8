//! Direct SMS sending.

use std::path::Path;

use clap::Args;
use sathi_core::Config;
use sathi_sms::{DeliveryOutcome, DispatchReport, SendOptions};

/// Send command arguments.
#[derive(Args)]
pub struct SendArgs {
    /// Message text
    pub message: String,

    /// Destination number (repeatable)
    #[arg(short, long = "to", required = true)]
    pub to: Vec<String>,

    /// Do not queue undelivered messages for later retry
    #[arg(long)]
    pub no_fallback: bool,

    /// Attempts per recipient (defaults to sms.max_retries)
    #[arg(long)]
    pub max_retries: Option<u32>,
}

impl SendArgs {
    /// Send options for this invocation.
    pub fn options(&self, config: &Config) -> SendOptions {
        SendOptions {
            allow_fallback: !self.no_fallback,
            max_retries: self.max_retries.unwrap_or(config.sms.max_retries),
        }
    }
}

/// Run the send command.
pub async fn run(args: SendArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let dispatcher = super::build_dispatcher(&config)?;

    let report = dispatcher
        .dispatch(args.to.clone(), &args.message, args.options(&config))
        .await;

    print_report(&report);

    if !report.all_sent() {
        anyhow::bail!(
            "{} of {} recipient(s) not delivered",
            report.recipients.len() - report.sent_count(),
            report.recipients.len()
        );
    }
    Ok(())
}

fn print_report(report: &DispatchReport) {
    if let Some(reason) = &report.aborted {
        println!("Dispatch aborted: {}", reason);
    }
    for recipient in &report.recipients {
        let to = recipient.normalized.as_deref().unwrap_or(&recipient.raw);
        match &recipient.outcome {
            DeliveryOutcome::Sent { attempts } => {
                println!("  sent    {:<18} after {} attempt(s)", to, attempts)
            }
            DeliveryOutcome::Failed { reason, queued: true } => {
                println!("  queued  {:<18} {}", to, reason)
            }
            DeliveryOutcome::Failed { reason, queued: false } => {
                println!("  failed  {:<18} {}", to, reason)
            }
            DeliveryOutcome::Invalid => println!("  invalid {:<18}", to),
        }
    }
}

//! Emergency alert command.

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use sathi_sms::platform::{CommandDialer, FixedLocator};
use sathi_sms::{AlertKind, AlertReport, EmergencyAlert, Location};

/// Alert command arguments.
#[derive(Args)]
pub struct AlertArgs {
    /// Alert type: pregnancy, eve-teasing, accident or other
    pub kind: AlertKind,

    /// Current latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Current longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,
}

/// Run the alert command.
pub async fn run(args: AlertArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let dispatcher = super::build_dispatcher(&config)?;

    let alert = EmergencyAlert::new(
        dispatcher,
        Arc::new(FixedLocator(Location::new(args.lat, args.lon))),
        Arc::new(CommandDialer::from_template(
            &config.alert.call_command,
            config.alert.call_permission,
        )),
        config.profile.clone(),
        config.officers.clone(),
    )
    .with_call_delay(config.call_delay());

    let report = alert.trigger(args.kind).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &AlertReport) {
    println!(
        "{} alert ({}) sent from {}",
        report.kind,
        report.kind.bengali_label(),
        report.location_url
    );
    println!(
        "  guardian  {}",
        if report.guardian_sent { "sent" } else { "not delivered" }
    );
    for (number, sent) in &report.officers {
        println!("  officer   {:<18} {}", number, if *sent { "sent" } else { "not delivered" });
    }
    println!(
        "  call      {}",
        if report.call_placed { "placed" } else { "skipped" }
    );
}

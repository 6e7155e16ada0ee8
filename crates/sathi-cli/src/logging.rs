//! Tracing subscriber setup.

use std::path::Path;

use sathi_core::config::LoggingConfig;
use sathi_core::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(verbose: u8, logging: &LoggingConfig) -> String {
    let level = match verbose {
        0 => logging.level.as_directive(),
        1 => "debug",
        _ => "trace",
    };
    format!("sathi={level}")
}

/// Logging section of the config file, or defaults when it cannot be loaded.
///
/// A broken file is reported later by the command itself.
pub fn logging_section(config_path: Option<&Path>) -> LoggingConfig {
    match config_path {
        Some(path) => Config::load(path).map(|c| c.logging).unwrap_or_default(),
        None => Config::load_or_default().logging,
    }
}

/// Install the global subscriber.
pub fn init(verbose: u8, config_path: Option<&Path>) {
    let logging = logging_section(config_path);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(verbose, &logging).into());

    let (plain, json) = if logging.json {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();
}

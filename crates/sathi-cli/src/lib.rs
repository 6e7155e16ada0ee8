//! Sathi command-line interface.

pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};

/// Sathi - emergency SMS alerts with an offline retry queue
#[derive(Parser)]
#[command(name = "sathi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "SATHI_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Send a silent SMS
    ///
    /// Undelivered messages are appended to the pending queue, which has a
    /// single writer. Do not run this while `sathi queue watch` runs in
    /// another process.
    Send(commands::send::SendArgs),

    /// Inspect and drain the pending SMS queue
    Queue(commands::queue::QueueArgs),

    /// Trigger an emergency alert
    ///
    /// Undelivered messages are appended to the pending queue, which has a
    /// single writer. Do not run this while `sathi queue watch` runs in
    /// another process.
    Alert(commands::alert::AlertArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Send(args) => commands::send::run(args, config_path).await,
        Commands::Queue(args) => commands::queue::run(args, config_path).await,
        Commands::Alert(args) => commands::alert::run(args, config_path).await,
        Commands::Config(args) => commands::config::run(args, config_path).await,
        Commands::Version => {
            println!("sathi {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

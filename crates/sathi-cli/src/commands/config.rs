//! Configuration management commands.

use std::path::Path;

use clap::Args;
use sathi_core::Config;
use serde_json::Value;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (dot-separated path)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = super::config_path(config_path)?;

    match args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        ConfigCommand::Get { key } => {
            let config = super::load_config(config_path)?;
            let json = serde_json::to_value(&config)?;
            match get_path(&json, &key) {
                Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
                None => anyhow::bail!("Key not found: {}", key),
            }
        }

        ConfigCommand::Set { key, value } => {
            let config = super::load_config(config_path)?;
            let updated = set_path(&config, &key, &value)?;
            updated.save(&path)?;
            println!("Set {} = {}", key, value);
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {:?}. Use --force to overwrite.",
                    path
                );
            }
            Config::default().save(&path)?;
            println!("Created config file: {:?}", path);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Validate => match Config::load(&path) {
            Ok(config) => match config.validate() {
                Ok(()) => println!("Configuration is valid"),
                Err(e) => anyhow::bail!("Configuration error: {}", e),
            },
            Err(e) => anyhow::bail!("Failed to load config: {}", e),
        },
    }

    Ok(())
}

/// Walk a dot-separated key path.
fn get_path<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |acc, k| match acc {
        Value::Array(items) => k.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => acc.get(k),
    })
}

/// Return a copy of `config` with the value at `key` replaced.
///
/// The value is parsed as JSON first (numbers, booleans, arrays) and falls
/// back to a plain string.
fn set_path(config: &Config, key: &str, value: &str) -> anyhow::Result<Config> {
    let mut json = serde_json::to_value(config)?;

    let parts: Vec<&str> = key.split('.').collect();
    let mut current = &mut json;
    for (i, part) in parts.iter().enumerate() {
        if i == parts.len() - 1 {
            let parsed: Value =
                serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
            current[*part] = parsed;
        } else {
            if !current.get(*part).map_or(false, |v| v.is_object()) {
                current[*part] = serde_json::json!({});
            }
            current = &mut current[*part];
        }
    }

    serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid configuration after set: {}", e))
}

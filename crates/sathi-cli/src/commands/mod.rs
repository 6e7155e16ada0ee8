//! CLI command implementations.

pub mod alert;
pub mod config;
pub mod queue;
pub mod send;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sathi_core::{paths, Config, ConfigError};
use sathi_sms::platform::{CommandTransport, StaticPermission, TracingNotifier};
use sathi_sms::{Dispatcher, DispatcherConfig, FilePendingStore};

/// Resolve the config file path, honoring `--config`.
pub fn config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(paths::config_file()?),
    }
}

/// Load configuration with environment overrides applied.
///
/// A missing file yields defaults; an unreadable or invalid one is an error.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = config_path(explicit)?;
    let config = match Config::load(&path) {
        Ok(mut config) => {
            config.apply_env_overrides();
            config
        }
        Err(ConfigError::NotFound(_)) => Config::from_env_defaults(),
        Err(e) => anyhow::bail!("Failed to load config {}: {}", path.display(), e),
    };
    Ok(config)
}

/// Open the file-backed pending store configured for this host.
pub fn open_store(config: &Config) -> anyhow::Result<Arc<FilePendingStore>> {
    Ok(Arc::new(FilePendingStore::new(config.queue_dir()?)))
}

/// Build a dispatcher wired to the host collaborators.
pub fn build_dispatcher(config: &Config) -> anyhow::Result<Arc<Dispatcher>> {
    let transport = Arc::new(CommandTransport::from_template(&config.sms.transport_command));
    let permission = Arc::new(StaticPermission(config.sms.send_permission));
    let store = open_store(config)?;

    let dispatcher = Dispatcher::new(transport, permission, Arc::new(TracingNotifier), store)
        .with_config(DispatcherConfig::from(config));
    Ok(Arc::new(dispatcher))
}

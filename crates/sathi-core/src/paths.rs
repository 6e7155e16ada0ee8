//! Path resolution utilities.

use crate::env;
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Sathi base directory (`~/.sathi`, or `$SATHI_HOME` when set).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(env::vars::SATHI_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".sathi"))
}

/// Get the main config file path (`~/.sathi/sathi.json5`, or `$SATHI_CONFIG`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::get_var(env::vars::SATHI_CONFIG) {
        return Ok(expand_tilde(&path));
    }
    Ok(base_dir()?.join("sathi.json5"))
}

/// Get the default pending queue directory (`~/.sathi/queue`).
pub fn queue_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("queue"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

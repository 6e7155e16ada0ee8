//! Configuration loading and persistence.

use super::Config;
use crate::error::ConfigError;
use crate::{env, paths, phone};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the linear backoff step.
pub const MAX_BACKOFF_STEP_MS: u64 = 60_000;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.sms.max_retries == 0 {
            errors.push("sms.max_retries must be greater than 0".to_string());
        }
        if self.sms.backoff_step_ms > MAX_BACKOFF_STEP_MS {
            errors.push(format!(
                "sms.backoff_step_ms must be at most {}",
                MAX_BACKOFF_STEP_MS
            ));
        }
        if self.sms.attempt_timeout_ms == Some(0) {
            errors.push("sms.attempt_timeout_ms must be greater than 0 when set".to_string());
        }
        if let Some(program) = self.sms.transport_command.first() {
            if program.trim().is_empty() {
                errors.push("sms.transport_command program must not be empty".to_string());
            }
        }

        if self.queue.process_max_retries == 0 {
            errors.push("queue.process_max_retries must be greater than 0".to_string());
        }
        if self.queue.lifetime_attempt_cap == 0 {
            errors.push("queue.lifetime_attempt_cap must be greater than 0".to_string());
        }
        if self.queue.interval_secs == 0 {
            errors.push("queue.interval_secs must be greater than 0".to_string());
        }

        if !self.profile.parent_mobile.is_empty()
            && phone::normalize(&self.profile.parent_mobile).is_none()
        {
            errors.push(format!(
                "profile.parentMobile '{}' is not a phone number",
                self.profile.parent_mobile
            ));
        }

        for (i, officer) in self.officers.iter().enumerate() {
            if !officer.officer_number.is_empty()
                && phone::normalize(&officer.officer_number).is_none()
            {
                errors.push(format!(
                    "officers[{}]: '{}' is not a phone number",
                    i, officer.officer_number
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Load configuration from the default path, falling back to defaults if no file exists.
    pub fn load_or_default() -> Self {
        match Self::load_default() {
            Ok(mut config) => {
                config.apply_env_overrides();
                config
            }
            Err(ConfigError::NotFound(_)) => Self::from_env_defaults(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable config: {}", e);
                Self::from_env_defaults()
            }
        }
    }

    /// Create a Config from defaults, adjusted by environment overrides.
    pub fn from_env_defaults() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply environment overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(secs) = env::get_u64(env::vars::SATHI_QUEUE_INTERVAL) {
            self.queue.interval_secs = secs;
        }
        if env::get_bool(env::vars::SATHI_DENY_SMS) {
            self.sms.send_permission = false;
        }
    }

    /// Resolve the pending queue directory.
    pub fn queue_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.queue.dir {
            Some(dir) => Ok(paths::expand_tilde(&dir.to_string_lossy())),
            None => paths::queue_dir(),
        }
    }

    /// Linear backoff step as a duration.
    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.sms.backoff_step_ms)
    }

    /// Per-attempt transport timeout, if any.
    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.sms.attempt_timeout_ms.map(Duration::from_millis)
    }

    /// Queue processing interval as a duration.
    pub fn queue_interval(&self) -> Duration {
        Duration::from_secs(self.queue.interval_secs)
    }

    /// Delay between the last alert SMS and the guardian call.
    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.alert.call_delay_ms)
    }
}

/// Configuration builder for creating configs programmatically.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-recipient attempt budget.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.sms.max_retries = max_retries;
        self
    }

    /// Set the transport command template.
    pub fn transport_command<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.sms.transport_command = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the queue directory.
    pub fn queue_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.queue.dir = Some(dir.into());
        self
    }

    /// Set the user profile.
    pub fn profile(mut self, name: impl Into<String>, parent_mobile: impl Into<String>) -> Self {
        self.config.profile.name = name.into();
        self.config.profile.parent_mobile = parent_mobile.into();
        self
    }

    /// Add an officer.
    pub fn officer(mut self, number: impl Into<String>) -> Self {
        self.config.officers.push(super::OfficerConfig {
            officer_number: number.into(),
            name: None,
        });
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: super::LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        self.config
    }
}

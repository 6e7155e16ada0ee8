//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Sathi configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SMS dispatch settings.
    #[serde(default)]
    pub sms: SmsConfig,

    /// Pending queue settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Emergency alert settings.
    #[serde(default)]
    pub alert: AlertConfig,

    /// Registered user profile.
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Officers associated with the user's registration area.
    #[serde(default)]
    pub officers: Vec<OfficerConfig>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SMS dispatch section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Per-recipient attempt budget for a direct send.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Linear backoff step; attempt `n` waits `n * step` before the next one.
    #[serde(default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,

    /// Per-attempt transport timeout. `None` waits indefinitely.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: Option<u64>,

    /// Whether the host has granted SMS send permission.
    #[serde(default = "default_true")]
    pub send_permission: bool,

    /// External command used to transmit one SMS.
    ///
    /// Each argument may contain `{to}` and `{message}` placeholders. An empty
    /// list means the platform cannot send SMS.
    #[serde(default)]
    pub transport_command: Vec<String>,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_step_ms: default_backoff_step_ms(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            send_permission: true,
            transport_command: Vec::new(),
        }
    }
}

/// Pending queue section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Directory holding the queue file. Defaults to `~/.sathi/queue`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Interval between background processing runs.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-recipient attempt budget used while draining the queue.
    #[serde(default = "default_process_max_retries")]
    pub process_max_retries: u32,

    /// Processing cycles a record may fail before it is discarded.
    #[serde(default = "default_lifetime_attempt_cap")]
    pub lifetime_attempt_cap: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            dir: None,
            interval_secs: default_interval_secs(),
            process_max_retries: default_process_max_retries(),
            lifetime_attempt_cap: default_lifetime_attempt_cap(),
        }
    }
}

/// Emergency alert section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Delay between the last SMS and the guardian call.
    #[serde(default = "default_call_delay_ms")]
    pub call_delay_ms: u64,

    /// External command used to place a call, with a `{to}` placeholder.
    #[serde(default)]
    pub call_command: Vec<String>,

    /// Whether the host has granted call permission.
    #[serde(default = "default_true")]
    pub call_permission: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            call_delay_ms: default_call_delay_ms(),
            call_command: Vec::new(),
            call_permission: true,
        }
    }
}

/// Registered user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    /// Display name used in alert messages.
    #[serde(default)]
    pub name: String,

    /// Guardian (emergency contact) number.
    #[serde(default)]
    pub parent_mobile: String,

    /// Organization-issued registration code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_code: Option<String>,
}

/// An officer attached to the user's registration area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerConfig {
    /// Officer phone number.
    #[serde(default)]
    pub officer_number: String,

    /// Officer name, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Logging section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_step_ms() -> u64 {
    300
}

fn default_attempt_timeout_ms() -> Option<u64> {
    Some(30_000)
}

fn default_interval_secs() -> u64 {
    60
}

fn default_process_max_retries() -> u32 {
    2
}

fn default_lifetime_attempt_cap() -> u32 {
    5
}

fn default_call_delay_ms() -> u64 {
    1_000
}

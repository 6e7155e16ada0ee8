//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Get an environment variable as a u64 (e.g., for intervals in seconds).
pub fn get_u64(name: &str) -> Option<u64> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Common environment variable names.
pub mod vars {
    /// Sathi home directory override.
    pub const SATHI_HOME: &str = "SATHI_HOME";

    /// Sathi config file override.
    pub const SATHI_CONFIG: &str = "SATHI_CONFIG";

    /// Pending queue processing interval override, in seconds.
    pub const SATHI_QUEUE_INTERVAL: &str = "SATHI_QUEUE_INTERVAL";

    /// Force the SMS send permission off (useful for drills).
    pub const SATHI_DENY_SMS: &str = "SATHI_DENY_SMS";
}

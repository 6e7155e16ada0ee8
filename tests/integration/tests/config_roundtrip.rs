//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be written to disk, loaded back
//! with identical field values, and drive the dispatcher the CLI builds.

use sathi_core::config::{Config, ConfigBuilder, LogLevel};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sathi.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.sms.max_retries, config.sms.max_retries);
    assert_eq!(loaded.sms.backoff_step_ms, config.sms.backoff_step_ms);
    assert_eq!(loaded.queue.interval_secs, config.queue.interval_secs);
    assert_eq!(loaded.queue.lifetime_attempt_cap, config.queue.lifetime_attempt_cap);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sathi.json5");

    let config = ConfigBuilder::new()
        .max_retries(5)
        .transport_command(["sms-send", "{to}", "{message}"])
        .profile("Rina", "+8801711000000")
        .officer("+8801819000000")
        .log_level(LogLevel::Debug)
        .build();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.sms.max_retries, 5);
    assert_eq!(loaded.sms.transport_command, vec!["sms-send", "{to}", "{message}"]);
    assert_eq!(loaded.profile.parent_mobile, "+8801711000000");
    assert_eq!(loaded.officers.len(), 1);
    assert_eq!(loaded.logging.level, LogLevel::Debug);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_hand_written_json5_is_accepted() {
    let config = Config::parse(
        r#"{
            // comments and trailing commas are fine
            sms: { max_retries: 2, },
            profile: { name: 'Rina', parentMobile: '+8801711000000' },
            officers: [{ officerNumber: '+8801819000000' }],
        }"#,
    )
    .unwrap();

    assert_eq!(config.sms.max_retries, 2);
    assert_eq!(config.profile.name, "Rina");
    assert_eq!(config.officers[0].officer_number, "+8801819000000");
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/sathi.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}

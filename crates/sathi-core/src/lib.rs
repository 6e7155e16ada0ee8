//! # sathi-core
//!
//! Core types, configuration, and utilities for Sathi.
//!
//! This crate provides shared functionality used across all Sathi crates:
//!
//! - **Configuration**: Loading, validation, and persistence of the config file
//! - **Phone numbers**: Normalization of user-entered destinations
//! - **Utilities**: Path resolution and environment handling

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod phone;

// Re-exports for convenience
pub use config::Config;
pub use error::ConfigError;

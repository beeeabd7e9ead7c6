//! Global configuration management for merkle-disclosure
//!
//! Settings live in ~/.merkle-disclosure/config.toml, or wherever
//! `MERKLE_DISCLOSURE_CONFIG` points.

pub mod global_config;

// Re-export commonly used items
pub use global_config::{ConfigKey, ConfigValue, GlobalConfig, CONFIG_PATH_ENV};

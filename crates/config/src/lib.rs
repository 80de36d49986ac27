//! Configuration management for the referral agent
//!
//! Supports loading configuration from:
//! - TOML files
//! - Environment variables (REFERRAL_AGENT_ prefix, `__` separator)
//! - Defaults baked into the `Default` impls

pub mod settings;

pub use settings::{
    CacheConfig, CatalogConfig, LlmSettings, ServerConfig, Settings, TranslatorConfig,
    load_settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

//! Application settings

use std::path::Path;
use std::time::Duration;

use referral_agent_core::Language;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    /// Structured-extraction model
    pub extractor: LlmSettings,
    /// Web-search-capable fallback model
    pub fallback: LlmSettings,
    pub translator: TranslatorConfig,
    pub catalog: CatalogConfig,
    pub cache: CacheConfig,
    /// Default response language when a request does not specify one
    pub default_language: Language,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Settings for one language-model backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model name/ID
    pub model: String,
    /// Chat-completions endpoint base URL
    pub endpoint: String,
    /// Bearer token (optional for local backends)
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Request timeout in seconds; conservative but finite so a hung
    /// downstream call cannot hold a request open indefinitely
    pub timeout_secs: u64,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff in milliseconds (doubles each retry)
    pub initial_backoff_ms: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "sonar-reasoning-pro".to_string(),
            endpoint: "https://api.perplexity.ai".to_string(),
            api_key: None,
            max_tokens: 1500,
            timeout_secs: 60,
            max_retries: 3,
            initial_backoff_ms: 100,
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

/// Translation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/translate".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Provider catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a JSON file of raw provider rows; absent means an empty
    /// catalog (every query takes the fallback path)
    pub path: Option<String>,
}

/// Fallback-cache policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries older than this are treated as a miss at read time
    pub ttl_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_days: 30 }
    }
}

/// Load settings from an optional TOML file plus environment overrides
///
/// Environment variables use the `REFERRAL_AGENT_` prefix with `__` as the
/// nesting separator, e.g. `REFERRAL_AGENT_SERVER__PORT=9000`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("REFERRAL_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;

    if settings.cache.ttl_days == 0 {
        return Err(ConfigError::InvalidValue {
            field: "cache.ttl_days".to_string(),
            message: "must be at least 1 day".to_string(),
        });
    }

    tracing::debug!(
        extractor = %settings.extractor.model,
        fallback = %settings.fallback.model,
        "Settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.cache.ttl_days, 30);
        assert_eq!(settings.default_language, Language::English);
    }

    #[test]
    fn test_load_without_file() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.fallback.max_tokens, 1500);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_settings(Some(Path::new("/nonexistent/agent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let toml = r#"
            default_language = "spanish"

            [server]
            port = 9000

            [cache]
            ttl_days = 7
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.cache.ttl_days, 7);
        assert_eq!(settings.default_language, Language::Spanish);
        // Untouched sections keep their defaults
        assert_eq!(settings.extractor.max_retries, 3);
    }
}

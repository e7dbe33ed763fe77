//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

use crate::data::ConflictPolicy;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub app: LocaleConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
}

/// Remote store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Path to the SQLite file backing the worker tables
    pub path: PathBuf,
}

/// Local cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Path to the device-local key/value file
    pub path: PathBuf,
    /// Maximum entries held in the in-memory read layer (default: 256)
    pub memory_capacity: u64,
}

/// Background profile sync configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Periodically reconcile the cached profile with the remote store
    pub enabled: bool,
    /// Sync interval in seconds (default: 300)
    pub interval_seconds: u64,
    /// Which copy wins when cache and remote disagree
    #[serde(default)]
    pub policy: ConflictPolicy,
}

/// Localization settings
#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    /// Language used until the user picks one (default: "en")
    pub default_language: String,
    /// Locale codes the application ships translations for
    pub supported_languages: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (GIGBOARD__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("remote.path", "data/remote.db")?
            .set_default("cache.path", "data/device-cache.db")?
            .set_default("cache.memory_capacity", 256)?
            .set_default("sync.enabled", false)?
            .set_default("sync.interval_seconds", 300)?
            .set_default("sync.policy", "remote_wins")?
            .set_default("app.default_language", "en")?
            .set_default("app.supported_languages", vec!["en", "hi", "mr", "ta", "te"])?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("GIGBOARD")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("app.supported_languages")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.cache.memory_capacity == 0 {
            return Err(crate::error::AppError::Config(
                "cache.memory_capacity must be greater than 0".to_string(),
            ));
        }

        if self.app.supported_languages.is_empty() {
            return Err(crate::error::AppError::Config(
                "app.supported_languages must not be empty".to_string(),
            ));
        }

        if !self
            .app
            .supported_languages
            .iter()
            .any(|code| code.eq_ignore_ascii_case(&self.app.default_language))
        {
            return Err(crate::error::AppError::Config(format!(
                "app.default_language '{}' is not in app.supported_languages",
                self.app.default_language
            )));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(crate::error::AppError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got '{}'",
                self.logging.format
            )));
        }

        if self
            .logging
            .level
            .parse::<tracing_subscriber::filter::LevelFilter>()
            .is_err()
        {
            return Err(crate::error::AppError::Config(format!(
                "logging.level '{}' is not a log level",
                self.logging.level
            )));
        }

        if self.sync.enabled && self.sync.interval_seconds == 0 {
            tracing::warn!("sync.interval_seconds=0 is invalid; it will be clamped to 1 second");
        }

        Ok(())
    }
}

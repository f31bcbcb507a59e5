//! Configuration management for the Sentinel API service
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use sentinel_api::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `SENTINEL_API__<section>__<key>`
//!
//! Examples:
//! - `SENTINEL_API__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `SENTINEL_API__PROVIDER__BASE_URL=https://creodias.sentinel-hub.com`
//! - `SENTINEL_API__RETENTION__ARTIFACT_TTL_HOURS=48`
//!
//! Provider credentials are only read from `SH_CLIENT_ID` and `SH_CLIENT_SECRET`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/sentinel-api.toml`.
//! This can be overridden using the `SENTINEL_API_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{
    ArtifactConfig, Config, DEFAULT_FIELD_POLYGON, ProviderConfig, QueryDefaults,
    RetentionConfig, ServerConfig,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed, credentials
    /// are missing, or a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, without reading credentials
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        Ok(sources::load_from_sources(path)?)
    }

    /// Validate a configuration assembled in code
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)?;
        Ok(())
    }
}

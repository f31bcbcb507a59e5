use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "SENTINEL_API_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/sentinel-api.toml";
const ENV_PREFIX: &str = "SENTINEL_API";
const ENV_SEPARATOR: &str = "__";

const CLIENT_ID_VAR: &str = "SH_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "SH_CLIENT_SECRET";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config);

    Ok(config)
}

/// Provider credentials never live in TOML files
fn load_secrets(config: &mut Config) {
    if let Ok(client_id) = env::var(CLIENT_ID_VAR) {
        config.provider.client_id = Some(client_id).filter(|v| !v.is_empty());
    }
    if let Ok(client_secret) = env::var(CLIENT_SECRET_VAR) {
        config.provider.client_secret = Some(client_secret).filter(|v| !v.is_empty());
    }
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // SENTINEL_API__PROVIDER__BASE_URL -> provider.base_url
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

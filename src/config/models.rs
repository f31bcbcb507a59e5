use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Field used when a request omits its polygon
pub const DEFAULT_FIELD_POLYGON: &str = r#"{"coordinates":[[[73.77544002083724,18.67297200337846],[73.77479411066756,18.672198614893645],[73.77535928206632,18.67195214969084],[73.77598725028642,18.672547065086846],[73.77544002083724,18.67297200337846]]],"type":"Polygon"}"#;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub defaults: QueryDefaults,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Earth-observation provider endpoint and credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// OAuth client id (loaded from environment, not from config file)
    #[serde(skip)]
    pub client_id: Option<String>,
    /// OAuth client secret (loaded from environment, not from config file)
    #[serde(skip)]
    pub client_secret: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_url: default_auth_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            client_id: None,
            client_secret: None,
        }
    }
}

fn default_base_url() -> String {
    "https://services.sentinel-hub.com".to_string()
}

fn default_auth_url() -> String {
    "https://services.sentinel-hub.com/auth/realms/main/protocol/openid-connect/token".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_user_agent() -> String {
    format!("sentinel-api/{}", env!("CARGO_PKG_VERSION"))
}

/// Where rendered imagery is written and how it is exposed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_artifact_root")]
    pub root: PathBuf,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            root: default_artifact_root(),
            url_prefix: default_url_prefix(),
        }
    }
}

fn default_artifact_root() -> PathBuf {
    PathBuf::from("static")
}

fn default_url_prefix() -> String {
    "/static".to_string()
}

/// Artifact retention
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    #[serde(default = "default_artifact_ttl_hours")]
    pub artifact_ttl_hours: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            artifact_ttl_hours: default_artifact_ttl_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_artifact_ttl_hours() -> u64 {
    24 * 7
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

/// Values substituted for omitted query parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryDefaults {
    #[serde(default = "default_polygon")]
    pub polygon: String,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            polygon: default_polygon(),
        }
    }
}

fn default_polygon() -> String {
    DEFAULT_FIELD_POLYGON.to_string()
}

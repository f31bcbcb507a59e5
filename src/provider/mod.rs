//! Earth-observation provider access (Sentinel Hub)
//!
//! ## Key Components
//!
//! - [`ImageryProvider`] - the three provider operations the service depends on
//! - [`SentinelHubClient`] - reqwest implementation against the provider HTTP APIs
//! - [`requests`] - request descriptors for catalog, process and statistics calls
//! - [`ProviderError`] - provider failures grouped into categories the API maps to status codes

mod client;
mod error;
pub mod requests;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

pub use client::SentinelHubClient;
pub use error::{ProviderError, Result};
pub use requests::{CatalogSearchRequest, ProcessRequest, StatisticalRequest, TimeRange};

/// One catalog search result
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFeature {
    #[serde(default)]
    pub id: Option<String>,
    pub properties: CatalogProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogProperties {
    pub datetime: Option<String>,
    #[serde(rename = "eo:cloud_cover")]
    pub cloud_cover: Option<f64>,
}

/// One page of catalog results; `context.next` points at the following page
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub features: Vec<CatalogFeature>,
    #[serde(default)]
    pub context: Option<CatalogContext>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogContext {
    pub next: Option<u64>,
}

/// Operations delegated to the Earth-observation provider
///
/// Implementations are shared across request tasks, so they must be
/// `Send + Sync`. Errors are already classified into [`ProviderError`].
#[async_trait]
pub trait ImageryProvider: Send + Sync {
    /// All catalog items matching the search, in provider order
    async fn search_catalog(&self, request: &CatalogSearchRequest) -> Result<Vec<CatalogFeature>>;

    /// Rendered image bytes for a process request
    async fn process(&self, request: &ProcessRequest) -> Result<Bytes>;

    /// Raw statistical aggregation payload
    async fn statistics(&self, request: &StatisticalRequest) -> Result<Value>;
}

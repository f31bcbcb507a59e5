//! HTTP client for the Sentinel Hub APIs

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, header};
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{ProviderError, Result};
use super::requests::{CatalogSearchRequest, PNG_MIME, ProcessRequest, StatisticalRequest};
use super::{CatalogFeature, CatalogPage, ImageryProvider};
use crate::config::ProviderConfig;

const CATALOG_SEARCH_PATH: &str = "/api/v1/catalog/1.0.0/search";
const PROCESS_PATH: &str = "/api/v1/process";
const STATISTICS_PATH: &str = "/api/v1/statistics";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Provider client bound to one set of credentials
///
/// A token is requested for every provider call; there is no token cache.
pub struct SentinelHubClient {
    client: Client,
    base_url: String,
    auth_url: String,
    client_id: String,
    client_secret: String,
}

impl SentinelHubClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let (client_id, client_secret) = match (&config.client_id, &config.client_secret) {
            (Some(id), Some(secret)) => (id.clone(), secret.clone()),
            _ => return Err(ProviderError::Auth("client credentials are not configured".into())),
        };

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_url: config.auth_url.clone(),
            client_id,
            client_secret,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn access_token(&self) -> Result<String> {
        let response = self
            .client
            .post(&self.auth_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Token request rejected");
            return Err(ProviderError::Auth(format!("HTTP {}: {}", status.as_u16(), message)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Auth(format!("invalid token response: {}", e)))?;

        Ok(token.access_token)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        accept: &str,
    ) -> Result<Response> {
        let token = self.access_token().await?;
        let url = self.endpoint(path);
        debug!(%url, "Calling provider");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(header::ACCEPT, accept)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "Provider call failed");
            return Err(ProviderError::from_status(status, message));
        }

        Ok(response)
    }
}

#[async_trait]
impl ImageryProvider for SentinelHubClient {
    async fn search_catalog(&self, request: &CatalogSearchRequest) -> Result<Vec<CatalogFeature>> {
        let mut features = Vec::new();
        let mut page_request = request.clone();

        loop {
            let page: CatalogPage = self
                .post_json(CATALOG_SEARCH_PATH, &page_request, "application/geo+json")
                .await?
                .json()
                .await
                .map_err(|e| ProviderError::Malformed(format!("catalog page: {}", e)))?;

            let returned = page.features.len();
            features.extend(page.features);

            match page.context.and_then(|c| c.next) {
                Some(next) if returned > 0 => page_request = request.with_next(next),
                _ => break,
            }
        }

        debug!(items = features.len(), "Catalog search complete");
        Ok(features)
    }

    async fn process(&self, request: &ProcessRequest) -> Result<Bytes> {
        let response = self.post_json(PROCESS_PATH, request, PNG_MIME).await?;

        if let Some(content_type) = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            let media_type: mime::Mime = content_type.parse().map_err(|_| {
                ProviderError::Malformed(format!("invalid Content-Type: {}", content_type))
            })?;
            if media_type.type_() != mime::IMAGE || media_type.subtype() != mime::PNG {
                return Err(ProviderError::Malformed(format!(
                    "expected image/png, got {}",
                    media_type.essence_str()
                )));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ProviderError::EmptyResult("process API returned an empty image".into()));
        }

        debug!(size = bytes.len(), "Process request complete");
        Ok(bytes)
    }

    async fn statistics(&self, request: &StatisticalRequest) -> Result<Value> {
        let payload: Value = self
            .post_json(STATISTICS_PATH, request, "application/json")
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("statistics payload: {}", e)))?;

        Ok(payload)
    }
}

//! Reshaping of provider responses into the API response contracts

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::models::{CatalogItem, ImageryResponse, StatsResponse};
use crate::provider::{CatalogFeature, ProviderError, TimeRange};

/// Calendar date of a catalog timestamp such as `2023-06-01T10:35:53.024Z`
pub fn acquisition_date(datetime: &str) -> Option<NaiveDate> {
    let trimmed = datetime.trim();
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .or_else(|_| NaiveDate::parse_from_str(naive, "%Y-%m-%d"))
        .ok()
}

/// One `{date, cloud cover}` item per catalog feature, in provider order
///
/// Features dated outside `window` are dropped.
pub fn dates_from_catalog(
    features: &[CatalogFeature],
    window: TimeRange,
) -> Result<Vec<CatalogItem>, ProviderError> {
    let mut items = Vec::with_capacity(features.len());

    for feature in features {
        let id = feature.id.as_deref().unwrap_or("<unnamed>");

        let datetime = feature.properties.datetime.as_deref().ok_or_else(|| {
            ProviderError::Malformed(format!("catalog item {} has no datetime", id))
        })?;
        let date = acquisition_date(datetime).ok_or_else(|| {
            ProviderError::Malformed(format!("catalog item {} has invalid datetime '{}'", id, datetime))
        })?;
        let cloud_cover = feature.properties.cloud_cover.ok_or_else(|| {
            ProviderError::Malformed(format!("catalog item {} has no eo:cloud_cover", id))
        })?;

        if !window.contains_date(date) {
            tracing::debug!(id, %date, "Dropping catalog item outside search window");
            continue;
        }

        items.push(CatalogItem { date, cloud_cover });
    }

    Ok(items)
}

/// Path of an artifact as served below `url_prefix`, e.g. `static/ndvi/field-imagery-<id>/response.png`
pub fn imagery_response(url_prefix: &str, key: &str) -> ImageryResponse {
    let prefix = url_prefix.trim_matches('/');
    let key = key.trim_start_matches('/');

    let path = if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", prefix, key)
    };

    ImageryResponse { path }
}

/// Provider payload passed through unchanged
pub fn stats_response(payload: Value) -> StatsResponse {
    StatsResponse { stats: payload }
}

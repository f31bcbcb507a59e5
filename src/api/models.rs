//! API models for the Sentinel field-imagery endpoints
//!
//! - `GET /dates/` takes [`DatesQuery`] and returns a list of [`CatalogItem`]
//! - `GET /imagery/` takes [`ImageryQuery`] and returns [`ImageryResponse`]
//! - `GET /ndvi-stats/` takes [`StatsQuery`] and returns [`StatsResponse`]
//!
//! Spatial parameters are JSON text embedded in the query string, e.g.
//!
//! ```text
//! /imagery/?index=ndvi&date=2023-06-01&bbox=[0,0,1,1]
//! /ndvi-stats/?geometry={"type":"Polygon","coordinates":[...]}&start_date=2023-01-01&end_date=2023-01-31
//! ```
//!
//! Omitted polygons fall back to the configured default field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::observability::MetricsSnapshot;

#[derive(Debug, Deserialize, Clone)]
pub struct DatesQuery {
    #[serde(default)]
    pub polygon: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageryQuery {
    #[serde(default)]
    pub geometry: Option<String>,
    pub bbox: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default)]
    pub evalscript: Option<String>,
    pub date: NaiveDate,
}

fn default_index() -> String {
    "ndvi".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatsQuery {
    #[serde(default)]
    pub geometry: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Acquisition date with its scene cloud cover
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CatalogItem {
    pub date: NaiveDate,
    #[serde(rename = "cloud cover")]
    pub cloud_cover: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageryResponse {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatsResponse {
    pub stats: Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: BTreeMap<String, String>,
    pub version: String,
    pub metrics: MetricsSnapshot,
}

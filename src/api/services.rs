use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;

use super::{
    error::ApiError,
    models::{DatesQuery, HealthResponse, ImageryQuery, StatsQuery},
    normalize,
    state::AppState,
};
use crate::evalscript::Index;
use crate::geometry::{PolygonGeometry, parse_bbox, parse_polygon};
use crate::provider::{CatalogSearchRequest, ProcessRequest, ProviderError, StatisticalRequest};

/// Landing endpoint (GET /)
pub async fn root() -> impl IntoResponse {
    Json(json!({"Hello": "World"}))
}

/// Available acquisition dates (GET /dates/)
///
/// Searches the provider catalog over the trailing 365 days for scenes
/// intersecting the polygon and returns one `{date, cloud cover}` item per
/// scene, in the order the provider reports them.
pub async fn dates(
    State(state): State<AppState>,
    Query(query): Query<DatesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let polygon = polygon_or_default(&state, query.polygon.as_deref())?;

    let request = CatalogSearchRequest::trailing_year(&polygon, Utc::now());
    let features = state
        .provider
        .search_catalog(&request)
        .await
        .map_err(|e| provider_failure(&state, e))?;

    let items = normalize::dates_from_catalog(&features, request.window())
        .map_err(|e| provider_failure(&state, e))?;

    tracing::info!(found = features.len(), returned = items.len(), "Catalog dates served");
    state.metrics.dates_served();

    Ok(Json(items))
}

/// Rendered index imagery for one day (GET /imagery/)
///
/// ## Flow:
/// 1. Resolve the index (unknown names are rejected here)
/// 2. Parse bbox and optional polygon
/// 3. Build the process request and allocate a fresh artifact folder
/// 4. Render through the provider and persist the PNG
/// 5. Return the artifact path, servable under the static prefix
pub async fn imagery(
    State(state): State<AppState>,
    Query(query): Query<ImageryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let index = Index::from_query(&query.index, query.evalscript.as_deref())?;
    let bbox = parse_bbox(&query.bbox)?;
    let geometry = query.geometry.as_deref().map(parse_polygon).transpose()?;

    let request = ProcessRequest::imagery()
        .bbox(bbox)
        .maybe_geometry(geometry)
        .date(query.date)
        .evalscript(index.evalscript())
        .call();

    let folder = state.artifacts.allocate(&index);
    tracing::debug!(%index, folder = %folder, date = %query.date, "Rendering imagery");

    let image = state
        .provider
        .process(&request)
        .await
        .map_err(|e| provider_failure(&state, e))?;

    let filenames = state.artifacts.write_response(&folder, &request, image).await?;
    let key = state.artifacts.locate(&folder, &filenames).await?;

    state.metrics.imagery_rendered();

    Ok(Json(normalize::imagery_response(&state.config.artifacts.url_prefix, &key)))
}

/// NDVI statistics in 5-day buckets (GET /ndvi-stats/)
pub async fn ndvi_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let polygon = polygon_or_default(&state, query.geometry.as_deref())?;

    let request = StatisticalRequest::ndvi(&polygon, query.start_date, query.end_date);
    let payload = state
        .provider
        .statistics(&request)
        .await
        .map_err(|e| provider_failure(&state, e))?;

    state.metrics.stats_served();

    Ok(Json(normalize::stats_response(payload)))
}

/// Health check endpoint (GET /health)
///
/// Reports 503 when the artifact root is no longer a directory.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = BTreeMap::new();
    components.insert("api".to_string(), "healthy".to_string());

    let artifacts_ok = tokio::fs::metadata(state.artifacts.root())
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    components.insert(
        "artifacts".to_string(),
        if artifacts_ok { "healthy" } else { "unhealthy" }.to_string(),
    );

    let status_code = if artifacts_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if artifacts_ok { "healthy" } else { "unhealthy" }.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
        metrics: state.metrics.snapshot(),
    };

    (status_code, Json(response))
}

fn polygon_or_default(state: &AppState, polygon: Option<&str>) -> Result<PolygonGeometry, ApiError> {
    let text = polygon.unwrap_or(&state.config.defaults.polygon);
    Ok(parse_polygon(text)?)
}

fn provider_failure(state: &AppState, err: ProviderError) -> ApiError {
    state.metrics.provider_failure();
    err.into()
}

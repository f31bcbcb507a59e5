//! SentinelHubClient against a local mock of the provider APIs
//!
//! The mock binds an ephemeral port and speaks just enough of the token,
//! catalog, process and statistics endpoints for the client paths.

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, sleep};

use sentinel_api::config::ProviderConfig;
use sentinel_api::evalscript::Index;
use sentinel_api::geometry::{parse_bbox, parse_polygon};
use sentinel_api::provider::{
    CatalogSearchRequest, ImageryProvider, ProcessRequest, ProviderError, SentinelHubClient,
    StatisticalRequest,
};

const TOKEN: &str = "test-token";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\nrendered";
const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[0,0],[0,1],[1,1],[1,0],[0,0]]]}"#;

/// How the mock answers data requests
#[derive(Clone, Copy)]
enum Mode {
    Ok,
    Status(StatusCode),
    WrongContentType,
}

struct MockState {
    mode: Mode,
    bodies: Mutex<Vec<Value>>,
    token_requests: Mutex<u32>,
}

type Shared = Arc<MockState>;

async fn token(State(state): State<Shared>, Form(form): Form<HashMap<String, String>>) -> Response {
    *state.token_requests.lock().unwrap() += 1;

    if form.get("grant_type").map(String::as_str) != Some("client_credentials")
        || form.get("client_secret").map(String::as_str) != Some("secret")
    {
        return (StatusCode::UNAUTHORIZED, "invalid_client").into_response();
    }

    Json(json!({"access_token": TOKEN, "expires_in": 3600})).into_response()
}

fn check(state: &MockState, headers: &HeaderMap, body: Value) -> Option<Response> {
    state.bodies.lock().unwrap().push(body);

    let expected = format!("Bearer {}", TOKEN);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return Some((StatusCode::UNAUTHORIZED, "missing token").into_response());
    }

    match state.mode {
        Mode::Status(status) => Some((status, "mock failure").into_response()),
        _ => None,
    }
}

async fn catalog(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let next = body.get("next").and_then(Value::as_u64);
    if let Some(failure) = check(&state, &headers, body) {
        return failure;
    }

    match next {
        None => Json(json!({
            "type": "FeatureCollection",
            "features": [
                {"id": "S2A_1", "properties": {"datetime": "2023-06-01T10:35:53Z", "eo:cloud_cover": 3.1}},
                {"id": "S2B_2", "properties": {"datetime": "2023-06-06T10:35:53Z", "eo:cloud_cover": 47.0}}
            ],
            "context": {"next": 2, "limit": 100, "returned": 2}
        }))
        .into_response(),
        Some(_) => Json(json!({
            "type": "FeatureCollection",
            "features": [
                {"id": "S2A_3", "properties": {"datetime": "2023-06-11T10:35:53Z", "eo:cloud_cover": 0.4}}
            ],
            "context": {"limit": 100, "returned": 1}
        }))
        .into_response(),
    }
}

async fn process(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(failure) = check(&state, &headers, body) {
        return failure;
    }

    let content_type = match state.mode {
        Mode::WrongContentType => "application/json",
        _ => "image/png",
    };
    ([(header::CONTENT_TYPE, content_type)], PNG).into_response()
}

async fn statistics(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(failure) = check(&state, &headers, body) {
        return failure;
    }

    Json(json!({"data": [], "status": "OK"})).into_response()
}

async fn start_mock_provider(mode: Mode) -> (ProviderConfig, Shared) {
    let state = Arc::new(MockState {
        mode,
        bodies: Mutex::new(Vec::new()),
        token_requests: Mutex::new(0),
    });

    let app = Router::new()
        .route("/oauth/token", post(token))
        .route("/api/v1/catalog/1.0.0/search", post(catalog))
        .route("/api/v1/process", post(process))
        .route("/api/v1/statistics", post(statistics))
        .with_state(state.clone());

    // Bind to random available port
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let bound_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    sleep(Duration::from_millis(50)).await;

    let config = ProviderConfig {
        base_url: format!("http://{}", bound_addr),
        auth_url: format!("http://{}/oauth/token", bound_addr),
        request_timeout_secs: 5,
        client_id: Some("client".to_string()),
        client_secret: Some("secret".to_string()),
        ..ProviderConfig::default()
    };

    (config, state)
}

fn catalog_request() -> CatalogSearchRequest {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    CatalogSearchRequest::trailing_year(&parse_polygon(SQUARE).unwrap(), now)
}

#[tokio::test]
async fn test_catalog_follows_pagination() {
    let (config, state) = start_mock_provider(Mode::Ok).await;
    let client = SentinelHubClient::new(&config).unwrap();

    let features = client.search_catalog(&catalog_request()).await.unwrap();

    let ids: Vec<_> = features.iter().filter_map(|f| f.id.as_deref()).collect();
    assert_eq!(ids, vec!["S2A_1", "S2B_2", "S2A_3"]);
    assert_eq!(features[1].properties.cloud_cover, Some(47.0));

    let bodies = state.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].get("next").is_none());
    assert_eq!(bodies[1]["next"], 2);
    assert_eq!(bodies[1]["datetime"], bodies[0]["datetime"]);
    assert_eq!(*state.token_requests.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_process_returns_png() {
    let (config, state) = start_mock_provider(Mode::Ok).await;
    let client = SentinelHubClient::new(&config).unwrap();

    let request = ProcessRequest::imagery()
        .bbox(parse_bbox("[0,0,1,1]").unwrap())
        .date(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap())
        .evalscript(Index::Ndvi.evalscript())
        .call();
    let image = client.process(&request).await.unwrap();

    assert_eq!(&image[..], PNG);
    assert_eq!(
        state.bodies.lock().unwrap()[0]["input"]["data"][0]["type"],
        "sentinel-2-l2a"
    );
}

#[tokio::test]
async fn test_process_rejects_non_png() {
    let (config, _) = start_mock_provider(Mode::WrongContentType).await;
    let client = SentinelHubClient::new(&config).unwrap();

    let request = ProcessRequest::imagery()
        .bbox(parse_bbox("[0,0,1,1]").unwrap())
        .date(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap())
        .evalscript(Index::Smi.evalscript())
        .call();

    assert!(matches!(
        client.process(&request).await,
        Err(ProviderError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_statistics_payload() {
    let (config, state) = start_mock_provider(Mode::Ok).await;
    let client = SentinelHubClient::new(&config).unwrap();

    let request = StatisticalRequest::ndvi(
        &parse_polygon(SQUARE).unwrap(),
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
    );
    let payload = client.statistics(&request).await.unwrap();

    assert_eq!(payload, json!({"data": [], "status": "OK"}));
    assert_eq!(
        state.bodies.lock().unwrap()[0]["aggregation"]["aggregationInterval"]["of"],
        "P5D"
    );
}

#[tokio::test]
async fn test_bad_credentials_are_auth_errors() {
    let (mut config, state) = start_mock_provider(Mode::Ok).await;
    config.client_secret = Some("wrong".to_string());
    let client = SentinelHubClient::new(&config).unwrap();

    let result = client.search_catalog(&catalog_request()).await;

    assert!(matches!(result, Err(ProviderError::Auth(_))));
    assert!(state.bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_status_classification() {
    let cases = [
        (StatusCode::TOO_MANY_REQUESTS, "quota"),
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        (StatusCode::BAD_REQUEST, "rejected"),
        (StatusCode::FORBIDDEN, "auth"),
    ];

    for (status, expected) in cases {
        let (config, _) = start_mock_provider(Mode::Status(status)).await;
        let client = SentinelHubClient::new(&config).unwrap();

        let err = client.search_catalog(&catalog_request()).await.unwrap_err();
        let kind = match err {
            ProviderError::Quota(_) => "quota",
            ProviderError::Unavailable { status: 503, .. } => "unavailable",
            ProviderError::Rejected { status: 400, .. } => "rejected",
            ProviderError::Auth(_) => "auth",
            other => panic!("unexpected error for {}: {}", status, other),
        };
        assert_eq!(kind, expected);
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    let config = ProviderConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        auth_url: "http://127.0.0.1:9/oauth/token".to_string(),
        connect_timeout_secs: 1,
        request_timeout_secs: 2,
        client_id: Some("client".to_string()),
        client_secret: Some("secret".to_string()),
        ..ProviderConfig::default()
    };
    let client = SentinelHubClient::new(&config).unwrap();

    let err = client.search_catalog(&catalog_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Network(_) | ProviderError::Timeout));
}

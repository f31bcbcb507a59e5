use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use super::{
    services::{dates, health, imagery, ndvi_stats, root},
    state::AppState,
};
use crate::artifacts::{ArtifactStore, retention};
use crate::config::Config;
use crate::provider::SentinelHubClient;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the router with all routes, static artifact serving and middleware
pub fn router(state: AppState) -> Router {
    let static_prefix = state.config.artifacts.url_prefix.clone();
    let static_files = ServeDir::new(state.artifacts.root());

    Router::new()
        .route("/", get(root))
        .route("/dates", get(dates))
        .route("/dates/", get(dates))
        .route("/imagery", get(imagery))
        .route("/imagery/", get(imagery))
        .route("/ndvi-stats", get(ndvi_stats))
        .route("/ndvi-stats/", get(ndvi_stats))
        .route("/health", get(health))
        .nest_service(&static_prefix, static_files)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn run(address: Option<SocketAddr>) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;
    let address = address.unwrap_or(config.server.bind_addr);

    let provider = SentinelHubClient::new(&config.provider)
        .map_err(|e| format!("Failed to create provider client: {}", e))?;

    info!(root = %config.artifacts.root.display(), "Opening artifact store");
    let artifacts = ArtifactStore::open(&config.artifacts.root)
        .map_err(|e| format!("Failed to open artifact store: {}", e))?;

    let state = AppState::new(config, Arc::new(provider), artifacts);

    let sweeper = retention::spawn(
        state.artifacts.clone(),
        state.config.retention.clone(),
        state.metrics.clone(),
    );

    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "Sentinel API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

use std::sync::Arc;

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::observability::Metrics;
use crate::provider::ImageryProvider;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn ImageryProvider>,
    pub artifacts: Arc<ArtifactStore>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: Config,
        provider: Arc<dyn ImageryProvider>,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            artifacts: Arc::new(artifacts),
            metrics: Arc::new(Metrics::new()),
        }
    }
}

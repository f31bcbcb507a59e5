//! Artifact retention: time-based eviction of rendered imagery
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use futures::TryStreamExt;
use object_store::ObjectMeta;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{ArtifactStore, Result};
use crate::config::RetentionConfig;
use crate::observability::Metrics;

/// Sweep statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub scanned: usize,
    pub evicted: usize,
}

/// Delete every artifact last modified at least `ttl` ago
pub async fn sweep(store: &ArtifactStore, ttl: Duration) -> Result<SweepStats> {
    let Some(cutoff) = TimeDelta::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_sub_signed(ttl))
    else {
        return Ok(SweepStats::default());
    };

    let objects: Vec<ObjectMeta> = store.object_store().list(None).try_collect().await?;

    let mut stats = SweepStats {
        scanned: objects.len(),
        evicted: 0,
    };

    for meta in objects.iter().filter(|meta| meta.last_modified <= cutoff) {
        match store.object_store().delete(&meta.location).await {
            Ok(()) => {
                debug!(key = %meta.location, "Artifact evicted");
                stats.evicted += 1;
            }
            Err(object_store::Error::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(stats)
}

/// Run [`sweep`] on a fixed interval until the runtime shuts down
pub fn spawn(store: Arc<ArtifactStore>, config: RetentionConfig, metrics: Arc<Metrics>) -> JoinHandle<()> {
    let ttl = artifact_ttl(&config);
    let period = Duration::from_secs(config.sweep_interval_secs);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;

            match sweep(&store, ttl).await {
                Ok(stats) => {
                    metrics.artifacts_evicted(stats.evicted as u64);
                    info!(scanned = stats.scanned, evicted = stats.evicted, "Artifact sweep complete");
                }
                Err(e) => warn!(error = %e, "Artifact sweep failed"),
            }
        }
    })
}

/// Configured TTL, saturating for absurdly large hour counts
fn artifact_ttl(config: &RetentionConfig) -> Duration {
    Duration::from_secs(config.artifact_ttl_hours.saturating_mul(3600))
}

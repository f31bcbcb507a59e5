//! Request and artifact counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    dates_served: AtomicU64,
    imagery_rendered: AtomicU64,
    stats_served: AtomicU64,
    provider_failures: AtomicU64,
    artifacts_evicted: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dates_served(&self) {
        self.dates_served.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "dates_served", "Metric incremented");
    }

    pub fn imagery_rendered(&self) {
        self.imagery_rendered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "imagery_rendered", "Metric incremented");
    }

    pub fn stats_served(&self) {
        self.stats_served.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "stats_served", "Metric incremented");
    }

    pub fn provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "provider_failures", "Metric incremented");
    }

    pub fn artifacts_evicted(&self, count: u64) {
        if count > 0 {
            self.artifacts_evicted.fetch_add(count, Ordering::Relaxed);
            tracing::debug!(counter = "artifacts_evicted", count, "Metric incremented");
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dates_served: self.dates_served.load(Ordering::Relaxed),
            imagery_rendered: self.imagery_rendered.load(Ordering::Relaxed),
            stats_served: self.stats_served.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            artifacts_evicted: self.artifacts_evicted.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub dates_served: u64,
    pub imagery_rendered: u64,
    pub stats_served: u64,
    pub provider_failures: u64,
    pub artifacts_evicted: u64,
}

//! Application state for the water dashboard.

use std::sync::Arc;

use earth_engine::WaterAreaSource;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::DashboardConfig;

/// Shared application state, passed to every handler.
pub struct AppState {
    /// Dashboard configuration.
    pub config: DashboardConfig,

    /// Remote computation backend.
    pub source: Arc<dyn WaterAreaSource>,

    /// Monthly queries allowed in flight per run (1 = strictly sequential).
    pub max_concurrent_queries: usize,

    /// Prometheus recorder handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: DashboardConfig, source: Arc<dyn WaterAreaSource>) -> Self {
        Self {
            config,
            source,
            max_concurrent_queries: 1,
            metrics: None,
        }
    }

    pub fn with_max_concurrent_queries(mut self, n: usize) -> Self {
        self.max_concurrent_queries = n.max(1);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

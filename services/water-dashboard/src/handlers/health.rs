//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub source: String,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Readiness check
///
/// The server only starts once credentials are loaded, so a running process
/// is ready; the body names the configured backend.
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ready: true,
        source: state.source.describe(),
    })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed\n",
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use test_utils::StubWaterSource;

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health_handler().await.0.status, "ok");
    }

    #[tokio::test]
    async fn test_ready_reports_source() {
        let state = Arc::new(AppState::new(
            DashboardConfig::default(),
            Arc::new(StubWaterSource::new()),
        ));
        let Json(ready) = ready_handler(Extension(state)).await;
        assert!(ready.ready);
        assert_eq!(ready.source, "stub");
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let state = Arc::new(AppState::new(
            DashboardConfig::default(),
            Arc::new(StubWaterSource::new()),
        ));
        let response = metrics_handler(Extension(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

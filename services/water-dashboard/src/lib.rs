//! Water Dashboard Service Library
//!
//! HTTP server for the monthly surface-water area dashboard: a login gate,
//! a server-rendered page with map, table and chart, and a small JSON/CSV API
//! over the same computation.

pub mod config;
pub mod handlers;
pub mod html;
pub mod params;
pub mod run;
pub mod session;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::session::session_layer;
use crate::state::AppState;

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    let sessions = session_layer(&state.config.login);

    Router::new()
        // Login gate
        .route(
            "/login",
            get(handlers::login::login_form_handler).post(handlers::login::login_handler),
        )
        .route("/logout", post(handlers::login::logout_handler))
        // Dashboard page
        .route("/", get(handlers::dashboard::dashboard_handler))
        // JSON API
        .route("/api/aoi", get(handlers::api::aoi_handler))
        .route("/api/months", get(handlers::api::months_handler))
        .route("/api/water-area", get(handlers::api::water_area_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(sessions)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

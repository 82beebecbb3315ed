//! HTTP request handlers for the water dashboard.

pub mod api;
pub mod dashboard;
pub mod health;
pub mod login;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tower_sessions::Session;
use water_common::DashboardError;

use crate::session::current_user;

/// Username of the request's session, or `Unauthorized`.
pub(crate) async fn require_session(session: &Session) -> Result<String, DashboardError> {
    current_user(session)
        .await?
        .ok_or(DashboardError::Unauthorized)
}

/// JSON exception body with the error's status code.
pub(crate) fn error_response(err: &DashboardError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_exception())).into_response()
}

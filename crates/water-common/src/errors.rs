//! Dashboard error types.

use thiserror::Error;

use crate::responses::ExceptionResponse;

/// Errors that end a dashboard run.
///
/// Per-month query failures are not represented here: they degrade to a
/// zero-valued row and the run continues.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Start date after end date.
    #[error("Start date must be on or before End date.")]
    InvalidDateRange,

    /// Invalid query parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No session, or the session is not logged in.
    #[error("Not logged in")]
    Unauthorized,

    /// Remote service could not be initialised for this run.
    #[error("Failed to initialize Earth Engine: {0}")]
    RemoteInit(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DashboardError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            DashboardError::InvalidDateRange => 400,
            DashboardError::InvalidParameter(_) => 400,
            DashboardError::Unauthorized => 401,
            DashboardError::RemoteInit(_) => 502,
            DashboardError::InternalError(_) => 500,
        }
    }

    /// Convert to an ExceptionResponse.
    pub fn to_exception(&self) -> ExceptionResponse {
        let detail = self.to_string();
        match self {
            DashboardError::InvalidDateRange | DashboardError::InvalidParameter(_) => {
                ExceptionResponse::bad_request(detail)
            }
            DashboardError::Unauthorized => ExceptionResponse::unauthorized(detail),
            DashboardError::RemoteInit(_) => ExceptionResponse::bad_gateway(detail),
            DashboardError::InternalError(_) => ExceptionResponse::internal_error(detail),
        }
    }
}

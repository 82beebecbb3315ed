//! Problem-detail style error bodies returned by the JSON API.

use serde::{Deserialize, Serialize};

const EXCEPTION_BASE: &str = "urn:water-dashboard:exception";

/// Exception response for errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExceptionResponse {
    /// Exception type identifier.
    #[serde(rename = "type")]
    pub type_: String,

    /// Human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// HTTP status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Detailed error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ExceptionResponse {
    /// Create a new exception response.
    pub fn new(type_: impl Into<String>, status: u16, detail: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            title: None,
            status: Some(status),
            detail: Some(detail.into()),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Create a 400 Bad Request exception.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(format!("{}:invalid-parameter", EXCEPTION_BASE), 400, detail)
            .with_title("Bad Request")
    }

    /// Create a 401 Unauthorized exception.
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(format!("{}:unauthorized", EXCEPTION_BASE), 401, detail)
            .with_title("Unauthorized")
    }

    /// Create a 502 Bad Gateway exception for remote-service failures.
    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self::new(format!("{}:remote-service", EXCEPTION_BASE), 502, detail)
            .with_title("Bad Gateway")
    }

    /// Create a 500 Internal Server Error exception.
    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(format!("{}:server-error", EXCEPTION_BASE), 500, detail)
            .with_title("Internal Server Error")
    }
}

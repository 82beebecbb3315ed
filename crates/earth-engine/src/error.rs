//! Error types for the Earth Engine client.

use thiserror::Error;

/// Errors raised while talking to Earth Engine.
#[derive(Error, Debug)]
pub enum EarthEngineError {
    /// Service-account credentials are missing or malformed.
    #[error("{0}")]
    Credentials(String),

    /// Signing the token assertion failed.
    #[error("failed to sign service account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The OAuth token endpoint rejected the assertion.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error payload.
    #[error("Earth Engine API error {code} ({status}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    /// The API answered 2xx but the body was not what the query expects.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl EarthEngineError {
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether this error happened before any query could be issued.
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            Self::Credentials(_) | Self::Signing(_) | Self::TokenExchange(_) | Self::Config(_)
        )
    }
}

/// Result type for Earth Engine operations.
pub type Result<T> = std::result::Result<T, EarthEngineError>;

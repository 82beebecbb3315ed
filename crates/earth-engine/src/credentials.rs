//! Service-account credential loading.
//!
//! The key is looked up in two places, in order:
//! 1. a YAML secrets file holding `GEE_SERVICE_ACCOUNT_KEY` (as a mapping or a JSON string)
//! 2. the `GEE_SERVICE_ACCOUNT_KEY` environment variable, holding the key JSON

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{EarthEngineError, Result};

/// Name of the secrets entry and of the environment variable.
pub const SERVICE_ACCOUNT_KEY_VAR: &str = "GEE_SERVICE_ACCOUNT_KEY";

/// Default OAuth token endpoint for Google service accounts.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const MISSING_CREDENTIALS: &str = "Missing GEE service account credentials.\n\n\
    Add GEE_SERVICE_ACCOUNT_KEY with 'client_email' and 'private_key' \
    to the secrets file or set it as an environment variable.";

const UNPARSEABLE_ENV: &str = "Failed to parse GEE_SERVICE_ACCOUNT_KEY from environment.";

/// The parts of a Google service-account key file this client needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub client_email: String,

    #[serde(default)]
    pub private_key: String,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub token_uri: Option<String>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Load the key from the secrets file (if present) or the environment.
    pub fn load(secrets_file: Option<&Path>) -> Result<Self> {
        let secrets = match secrets_file {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    EarthEngineError::Config(format!(
                        "failed to read secrets file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let value: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
                    EarthEngineError::Config(format!(
                        "failed to parse secrets file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                debug!(path = %path.display(), "Read secrets file");
                Some(value)
            }
            _ => None,
        };

        let env = std::env::var(SERVICE_ACCOUNT_KEY_VAR).ok();
        let key = Self::resolve(secrets.as_ref(), env.as_deref())?;
        info!(client_email = %key.client_email, "Loaded service account credentials");
        Ok(key)
    }

    /// Pick the key from already-read sources. Secrets take precedence over the environment.
    pub fn resolve(secrets: Option<&serde_yaml::Value>, env: Option<&str>) -> Result<Self> {
        let key = match secrets.and_then(|s| s.get(SERVICE_ACCOUNT_KEY_VAR)) {
            Some(entry) => Some(Self::from_secret_entry(entry)?),
            None => match env {
                Some(raw) if !raw.trim().is_empty() => Some(
                    serde_json::from_str::<Self>(raw)
                        .map_err(|_| EarthEngineError::credentials(UNPARSEABLE_ENV))?,
                ),
                _ => None,
            },
        };

        match key {
            Some(key) if !key.client_email.is_empty() && !key.private_key.is_empty() => Ok(key),
            _ => Err(EarthEngineError::credentials(MISSING_CREDENTIALS)),
        }
    }

    fn from_secret_entry(entry: &serde_yaml::Value) -> Result<Self> {
        let parsed = match entry {
            serde_yaml::Value::String(raw) => serde_json::from_str::<Self>(raw).map_err(|e| {
                EarthEngineError::credentials(format!(
                    "Failed to parse {} from secrets file: {}",
                    SERVICE_ACCOUNT_KEY_VAR, e
                ))
            })?,
            other => serde_yaml::from_value::<Self>(other.clone()).map_err(|e| {
                EarthEngineError::credentials(format!(
                    "Failed to parse {} from secrets file: {}",
                    SERVICE_ACCOUNT_KEY_VAR, e
                ))
            })?,
        };
        Ok(parsed)
    }

    /// Token endpoint, defaulting to Google's.
    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

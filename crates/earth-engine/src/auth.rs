//! OAuth access tokens for a service account (JWT bearer grant).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::credentials::ServiceAccountKey;
use crate::error::{EarthEngineError, Result};

/// OAuth scope required by the Earth Engine API.
pub const EARTH_ENGINE_SCOPE: &str = "https://www.googleapis.com/auth/earthengine";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion; Google caps it at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Claims of the signed assertion sent to the token endpoint.
#[derive(Debug, Serialize, PartialEq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(key: &ServiceAccountKey, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: key.client_email.clone(),
            scope: EARTH_ENGINE_SCOPE.to_string(),
            aud: key.token_uri().to_string(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Exchanges signed service-account assertions for access tokens and caches the result.
pub struct TokenProvider {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a provider; fails early if the private key is not a valid RSA PEM.
    pub fn new(client: Client, key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            client,
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Sign an assertion for the given instant.
    pub fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims::new(&self.key, now);
        let header = Header::new(Algorithm::RS256);
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Return a valid access token, exchanging a new assertion when needed.
    #[instrument(skip(self), fields(client_email = %self.key.client_email))]
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let assertion = self.sign_assertion(now)?;
        debug!(token_uri = %self.key.token_uri(), "Exchanging service account assertion");

        let response = self
            .client
            .post(self.key.token_uri())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| EarthEngineError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EarthEngineError::TokenExchange(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| {
                EarthEngineError::TokenExchange(format!("invalid token response: {}", e))
            })?;

        let fresh = CachedToken {
            value: token.access_token,
            expires_at: now + chrono::Duration::seconds(token.expires_in),
        };
        info!(expires_at = %fresh.expires_at, "Obtained Earth Engine access token");

        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

//! REST client for the Earth Engine `value:compute` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use water_common::MonthRange;

use crate::auth::TokenProvider;
use crate::credentials::ServiceAccountKey;
use crate::error::{EarthEngineError, Result};
use crate::expression::{image_count_expression, water_pixel_count_expression};
use crate::query::WaterQuery;
use crate::source::WaterAreaSource;

/// Public Earth Engine API endpoint.
pub const DEFAULT_API_BASE: &str = "https://earthengine.googleapis.com";

/// Key of the band in the reduction dictionary (the constant-one image).
const REDUCTION_KEY: &str = "constant";

/// Connection settings for [`EarthEngineClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without the `/v1` suffix.
    pub api_base: String,
    /// Cloud project billed for the queries. Falls back to the key's `project_id`.
    pub project: Option<String>,
    /// Transport timeout for each request.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            project: None,
            request_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Earth Engine client authenticated as a service account.
pub struct EarthEngineClient {
    client: Client,
    tokens: TokenProvider,
    api_base: String,
    project: String,
}

impl EarthEngineClient {
    /// Create a client. Fails if no project can be determined or the key is unusable.
    pub fn new(key: ServiceAccountKey, config: ClientConfig) -> Result<Self> {
        let project = config
            .project
            .clone()
            .or_else(|| key.project_id.clone())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                EarthEngineError::Config(
                    "no Earth Engine project: set GEE_PROJECT or include project_id in the key"
                        .to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EarthEngineError::Config(format!("failed to create HTTP client: {}", e)))?;

        let tokens = TokenProvider::new(client.clone(), key)?;

        Ok(Self {
            client,
            tokens,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            project,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn compute_url(&self) -> String {
        format!("{}/v1/projects/{}/value:compute", self.api_base, self.project)
    }

    /// Evaluate an expression graph and return its `result` value.
    #[instrument(skip(self, expression), fields(project = %self.project))]
    pub async fn compute(&self, expression: Value) -> Result<Value> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(self.compute_url())
            .bearer_auth(token)
            .json(&json!({ "expression": expression }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(parse_api_error(status, &body));
        }

        let mut parsed: Value = serde_json::from_str(&body)
            .map_err(|e| EarthEngineError::invalid_response(format!("invalid JSON: {}", e)))?;

        debug!(bytes = body.len(), "value:compute response");
        Ok(parsed
            .get_mut("result")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }
}

/// Turn a non-2xx response into an error, keeping the API's message when there is one.
pub fn parse_api_error(status: StatusCode, body: &str) -> EarthEngineError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => EarthEngineError::Api {
            code: if parsed.error.code == 0 {
                status.as_u16()
            } else {
                parsed.error.code
            },
            status: parsed.error.status,
            message: parsed.error.message,
        },
        Err(_) => EarthEngineError::Api {
            code: status.as_u16(),
            status: status.canonical_reason().unwrap_or("").to_string(),
            message: body.chars().take(500).collect(),
        },
    }
}

/// Interpret the result of a `Collection.size` expression.
pub fn parse_image_count(result: &Value) -> Result<u64> {
    result
        .as_u64()
        .or_else(|| result.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
        .ok_or_else(|| {
            EarthEngineError::invalid_response(format!("expected a count, got {}", result))
        })
}

/// Interpret the dictionary returned by `Image.reduceRegion`.
///
/// `None` when the key is missing, null, or not numeric.
pub fn parse_pixel_sum(result: &Value) -> Option<f64> {
    result.get(REDUCTION_KEY).and_then(Value::as_f64)
}

#[async_trait]
impl WaterAreaSource for EarthEngineClient {
    async fn ensure_ready(&self) -> Result<()> {
        self.tokens.access_token().await.map(|_| ())
    }

    #[instrument(skip(self, query), fields(month = %month.label()))]
    async fn image_count(&self, query: &WaterQuery, month: &MonthRange) -> Result<u64> {
        let result = self.compute(image_count_expression(query, month)).await?;
        parse_image_count(&result)
    }

    #[instrument(skip(self, query), fields(month = %month.label()))]
    async fn water_pixel_count(
        &self,
        query: &WaterQuery,
        month: &MonthRange,
    ) -> Result<Option<f64>> {
        let result = self.compute(water_pixel_count_expression(query, month)).await?;
        Ok(parse_pixel_sum(&result))
    }

    fn describe(&self) -> String {
        format!(
            "earth-engine project={} account={}",
            self.project,
            self.tokens.client_email()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_error_payload() {
        let body = r#"{"error": {"code": 400, "message": "Image.select: Band 'wter' not found.", "status": "INVALID_ARGUMENT"}}"#;
        match parse_api_error(StatusCode::BAD_REQUEST, body) {
            EarthEngineError::Api { code, status, message } => {
                assert_eq!(code, 400);
                assert_eq!(status, "INVALID_ARGUMENT");
                assert!(message.contains("wter"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_api_error_plain_text() {
        match parse_api_error(StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable") {
            EarthEngineError::Api { code, status, message } => {
                assert_eq!(code, 503);
                assert_eq!(status, "Service Unavailable");
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_image_count() {
        assert_eq!(parse_image_count(&json!(42)).unwrap(), 42);
        assert_eq!(parse_image_count(&json!(0)).unwrap(), 0);
        assert_eq!(parse_image_count(&json!(3.0)).unwrap(), 3);
        assert!(parse_image_count(&json!("many")).is_err());
        assert!(parse_image_count(&Value::Null).is_err());
    }

    #[test]
    fn test_parse_pixel_sum() {
        assert_eq!(parse_pixel_sum(&json!({ "constant": 1234.56 })), Some(1234.56));
        assert_eq!(parse_pixel_sum(&json!({ "constant": 0 })), Some(0.0));
        assert_eq!(parse_pixel_sum(&json!({ "constant": null })), None);
        assert_eq!(parse_pixel_sum(&json!({})), None);
        assert_eq!(parse_pixel_sum(&Value::Null), None);
    }

    #[test]
    fn test_missing_project_is_a_config_error() {
        let key = ServiceAccountKey::resolve(
            None,
            Some(r#"{"client_email": "sa@x.iam.gserviceaccount.com", "private_key": "pem"}"#),
        )
        .unwrap();

        let err = EarthEngineClient::new(key, ClientConfig::default()).err().unwrap();
        assert!(matches!(err, EarthEngineError::Config(_)));
    }
}

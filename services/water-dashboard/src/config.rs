//! Dashboard configuration loading and types.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use earth_engine::DatasetConfig;
use serde::{Deserialize, Serialize};

/// Dashboard configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Name of the site shown in the page title.
    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// Values the input form starts with.
    #[serde(default)]
    pub defaults: InputDefaults,

    /// Map display settings.
    #[serde(default)]
    pub map: MapConfig,

    /// Raster and reduction parameters.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Demo login gate.
    #[serde(default)]
    pub login: LoginConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            defaults: InputDefaults::default(),
            map: MapConfig::default(),
            dataset: DatasetConfig::default(),
            login: LoginConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a YAML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Dashboard config {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse dashboard config: {:?}", path))?;

        tracing::info!(site = %config.site_name, "Loaded dashboard config from {:?}", path);
        Ok(config)
    }
}

fn default_site_name() -> String {
    "Panshet Dam".to_string()
}

/// Initial form values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDefaults {
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Inclusive.
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,

    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    #[serde(default = "default_center_lon")]
    pub center_lon: f64,

    #[serde(default = "default_side_km")]
    pub side_km: f64,

    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Longest accepted date range, in calendar months.
    #[serde(default = "default_max_months")]
    pub max_months: u32,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default()
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap_or_default()
}

// Approximate center of Panshet (Tanaji Sagar) dam, Pune, India.
fn default_center_lat() -> f64 {
    18.405
}

fn default_center_lon() -> f64 {
    73.585
}

fn default_side_km() -> f64 {
    2.0
}

fn default_threshold() -> f64 {
    0.5
}

fn default_max_months() -> u32 {
    120
}

impl Default for InputDefaults {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            side_km: default_side_km(),
            threshold: default_threshold(),
            max_months: default_max_months(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Tile URL template for the base layer.
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
}

fn default_zoom() -> u8 {
    12
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            tile_url: default_tile_url(),
        }
    }
}

/// Fixed credentials for the demo login gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Idle time after which a session expires, in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,

    /// Mark the session cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub secure_cookie: bool,

    /// Upper bound on sessions held at once.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
}

fn default_username() -> String {
    "ndsa".to_string()
}

fn default_password() -> String {
    "cwprs".to_string()
}

fn default_session_ttl_secs() -> i64 {
    8 * 60 * 60
}

fn default_max_sessions() -> u64 {
    10_000
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            session_ttl_secs: default_session_ttl_secs(),
            secure_cookie: false,
            max_sessions: default_max_sessions(),
        }
    }
}

impl LoginConfig {
    pub fn accepts(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

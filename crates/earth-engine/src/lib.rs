//! Earth Engine access for the monthly surface-water dashboard.
//!
//! Only what the dashboard needs is implemented: service-account
//! authentication, two expression graphs (image count and thresholded pixel
//! sum), and the `value:compute` call. The monthly driver works against the
//! [`WaterAreaSource`] trait so it can be exercised without the network.

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod expression;
pub mod monthly;
pub mod query;
pub mod source;

pub use client::{ClientConfig, EarthEngineClient, DEFAULT_API_BASE};
pub use credentials::{ServiceAccountKey, SERVICE_ACCOUNT_KEY_VAR};
pub use error::{EarthEngineError, Result};
pub use monthly::compute_monthly_water_area;
pub use query::{DatasetConfig, WaterQuery, DYNAMIC_WORLD_COLLECTION};
pub use source::WaterAreaSource;

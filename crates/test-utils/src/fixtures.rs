//! Common test fixtures for water-dashboard tests.
//!
//! This module provides pre-defined inputs and a scriptable in-memory
//! [`WaterAreaSource`] so handlers and the monthly driver can be tested
//! without network access.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Datelike;
use earth_engine::{EarthEngineError, Result, WaterAreaSource, WaterQuery};
use water_common::MonthRange;

use crate::generators::reservoir_pixel_sum;

/// Default dashboard site: Panshet (Tanaji Sagar) dam, Pune.
pub mod panshet {
    pub const CENTER_LAT: f64 = 18.405;
    pub const CENTER_LON: f64 = 73.585;
    pub const SIDE_KM: f64 = 2.0;
}

/// In-memory source answering from a seasonal table, with per-month overrides.
///
/// Unless overridden, every month has 5 images and the pixel sum from
/// [`reservoir_pixel_sum`].
#[derive(Default)]
pub struct StubWaterSource {
    empty_months: HashSet<String>,
    failing_months: HashSet<String>,
    sums: HashMap<String, Option<f64>>,
    init_error: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl StubWaterSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report zero images for `month` (`YYYY-MM`).
    pub fn with_empty_month(mut self, month: &str) -> Self {
        self.empty_months.insert(month.to_string());
        self
    }

    /// Fail the reduction for `month`.
    pub fn with_failing_month(mut self, month: &str) -> Self {
        self.failing_months.insert(month.to_string());
        self
    }

    /// Fix the reduction result for `month`; `None` simulates a missing key.
    pub fn with_sum(mut self, month: &str, sum: Option<f64>) -> Self {
        self.sums.insert(month.to_string(), sum);
        self
    }

    /// Make `ensure_ready` fail with a token-exchange error.
    pub fn with_init_error(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    /// Months for which `image_count` was called, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WaterAreaSource for StubWaterSource {
    async fn ensure_ready(&self) -> Result<()> {
        match &self.init_error {
            Some(message) => Err(EarthEngineError::TokenExchange(message.clone())),
            None => Ok(()),
        }
    }

    async fn image_count(&self, _query: &WaterQuery, month: &MonthRange) -> Result<u64> {
        let label = month.label();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(label.clone());
        }
        Ok(if self.empty_months.contains(&label) { 0 } else { 5 })
    }

    async fn water_pixel_count(
        &self,
        _query: &WaterQuery,
        month: &MonthRange,
    ) -> Result<Option<f64>> {
        let label = month.label();
        if self.failing_months.contains(&label) {
            return Err(EarthEngineError::Api {
                code: 500,
                status: "INTERNAL".to_string(),
                message: "Computation timed out.".to_string(),
            });
        }
        Ok(self
            .sums
            .get(&label)
            .copied()
            .unwrap_or_else(|| Some(reservoir_pixel_sum(month.start.month()))))
    }

    fn describe(&self) -> String {
        "stub".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use water_common::BoundingBox;

    fn june() -> MonthRange {
        MonthRange {
            start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        }
    }

    fn query() -> WaterQuery {
        WaterQuery::new(
            BoundingBox::square(panshet::CENTER_LAT, panshet::CENTER_LON, panshet::SIDE_KM),
            0.5,
        )
    }

    #[tokio::test]
    async fn test_defaults_follow_seasonal_table() {
        let stub = StubWaterSource::new();
        assert_eq!(stub.image_count(&query(), &june()).await.unwrap(), 5);
        assert_eq!(
            stub.water_pixel_count(&query(), &june()).await.unwrap(),
            Some(reservoir_pixel_sum(6))
        );
        assert_eq!(stub.calls(), vec!["2024-06".to_string()]);
    }

    #[tokio::test]
    async fn test_overrides() {
        let stub = StubWaterSource::new()
            .with_empty_month("2024-06")
            .with_init_error("invalid_grant");

        assert_eq!(stub.image_count(&query(), &june()).await.unwrap(), 0);
        assert!(stub.ensure_ready().await.is_err());

        let failing = StubWaterSource::new().with_failing_month("2024-06");
        assert!(failing.water_pixel_count(&query(), &june()).await.is_err());
    }
}

//! Monthly water-area driver.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use metrics::counter;
use tracing::{debug, info, warn};
use water_common::{month_ranges, MonthRange, MonthlyWaterArea};

use crate::error::Result;
use crate::query::WaterQuery;
use crate::source::WaterAreaSource;

/// Compute one row per calendar month of `[start, end]`.
///
/// `ensure_ready` failures abort the run. Anything that goes wrong for a single
/// month (empty collection, failed call, missing or unparseable result) yields a
/// zero row for that month and the run continues.
///
/// With `concurrency <= 1` the months are queried strictly one after another in
/// ascending order; otherwise up to `concurrency` queries are in flight. Rows are
/// always returned in ascending month order.
pub async fn compute_monthly_water_area(
    source: &dyn WaterAreaSource,
    query: &WaterQuery,
    start: NaiveDate,
    end: NaiveDate,
    concurrency: usize,
) -> Result<Vec<MonthlyWaterArea>> {
    source.ensure_ready().await?;

    info!(
        %start,
        %end,
        threshold = query.threshold,
        concurrency,
        source = %source.describe(),
        "Computing monthly water area"
    );

    let rows = stream::iter(month_ranges(start, end))
        .map(|month| month_row(source, query, month))
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    Ok(rows)
}

async fn month_row(
    source: &dyn WaterAreaSource,
    query: &WaterQuery,
    month: MonthRange,
) -> MonthlyWaterArea {
    counter!("water_dashboard_month_queries_total").increment(1);

    match query_month(source, query, &month).await {
        Ok(pixel_count) => {
            debug!(month = %month.label(), pixel_count, "Month complete");
            MonthlyWaterArea::from_pixel_count_at_scale(&month, pixel_count, query.dataset.scale_m)
        }
        Err(e) => {
            counter!("water_dashboard_month_query_failures_total").increment(1);
            warn!(month = %month.label(), error = %e, "Month query failed, reporting zero");
            MonthlyWaterArea::zero(&month)
        }
    }
}

async fn query_month(
    source: &dyn WaterAreaSource,
    query: &WaterQuery,
    month: &MonthRange,
) -> Result<u64> {
    if source.image_count(query, month).await? == 0 {
        debug!(month = %month.label(), "No images for month");
        return Ok(0);
    }

    let pixel_count = match source.water_pixel_count(query, month).await? {
        Some(sum) if sum.is_finite() && sum > 0.0 => sum.trunc() as u64,
        Some(_) => 0,
        None => {
            debug!(month = %month.label(), "Reduction returned no value");
            0
        }
    };
    Ok(pixel_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EarthEngineError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use water_common::BoundingBox;

    /// Scripted per-month answers keyed by `YYYY-MM`.
    #[derive(Default)]
    struct ScriptedSource {
        images: HashMap<String, u64>,
        sums: HashMap<String, Option<f64>>,
        failing: Vec<String>,
        delays_ms: HashMap<String, u64>,
        not_ready: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl WaterAreaSource for ScriptedSource {
        async fn ensure_ready(&self) -> Result<()> {
            if self.not_ready {
                return Err(EarthEngineError::TokenExchange("invalid_grant".to_string()));
            }
            Ok(())
        }

        async fn image_count(&self, _query: &WaterQuery, month: &MonthRange) -> Result<u64> {
            self.calls.lock().unwrap().push(month.label());
            Ok(*self.images.get(&month.label()).unwrap_or(&3))
        }

        async fn water_pixel_count(
            &self,
            _query: &WaterQuery,
            month: &MonthRange,
        ) -> Result<Option<f64>> {
            if let Some(ms) = self.delays_ms.get(&month.label()) {
                tokio::time::sleep(std::time::Duration::from_millis(*ms)).await;
            }
            if self.failing.contains(&month.label()) {
                return Err(EarthEngineError::invalid_response("boom"));
            }
            Ok(self.sums.get(&month.label()).copied().unwrap_or(Some(100.0)))
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn query() -> WaterQuery {
        WaterQuery::new(BoundingBox::square(18.405, 73.585, 2.0), 0.5)
    }

    #[test]
    fn test_rows_per_month() {
        let source = ScriptedSource::default();
        let rows = tokio_test::block_on(compute_monthly_water_area(
            &source,
            &query(),
            d(2024, 6, 1),
            d(2024, 8, 31),
            1,
        ))
        .unwrap();

        let months: Vec<_> = rows.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, vec!["2024-06", "2024-07", "2024-08"]);
        assert!(rows.iter().all(|r| r.pixel_count == 100 && r.area_m2 == 10_000.0));
    }

    #[tokio::test]
    async fn test_empty_month_is_zero_not_error() {
        let mut source = ScriptedSource::default();
        source.images.insert("2024-07".to_string(), 0);

        let rows = compute_monthly_water_area(&source, &query(), d(2024, 6, 1), d(2024, 8, 31), 1)
            .await
            .unwrap();

        assert_eq!(rows[1].month, "2024-07");
        assert_eq!(rows[1].pixel_count, 0);
        assert_eq!(rows[1].area_m2, 0.0);
        assert_eq!(rows[0].pixel_count, 100);
    }

    #[tokio::test]
    async fn test_failures_and_missing_results_degrade_to_zero() {
        let mut source = ScriptedSource::default();
        source.failing.push("2024-06".to_string());
        source.sums.insert("2024-07".to_string(), None);
        source.sums.insert("2024-08".to_string(), Some(2500.9));

        let rows = compute_monthly_water_area(&source, &query(), d(2024, 6, 1), d(2024, 8, 31), 1)
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].pixel_count, 0);
        assert_eq!(rows[1].pixel_count, 0);
        // Fractional sums are truncated
        assert_eq!(rows[2].pixel_count, 2500);
        assert_eq!(rows[2].area_m2, 250_000.0);
    }

    #[tokio::test]
    async fn test_init_failure_aborts_run() {
        let source = ScriptedSource {
            not_ready: true,
            ..Default::default()
        };

        let result =
            compute_monthly_water_area(&source, &query(), d(2024, 6, 1), d(2024, 8, 31), 1).await;

        assert!(result.is_err());
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sequential_issue_order() {
        let source = ScriptedSource::default();
        compute_monthly_water_area(&source, &query(), d(2024, 11, 20), d(2025, 2, 3), 1)
            .await
            .unwrap();

        let calls = source.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
    }

    #[tokio::test]
    async fn test_concurrent_mode_preserves_order() {
        let months = ["2024-01", "2024-02", "2024-03", "2024-04", "2024-05"];
        let mut source = ScriptedSource::default();
        for (i, month) in months.iter().enumerate() {
            source.sums.insert(month.to_string(), Some(i as f64 * 10.0));
            // Earlier months answer last
            source.delays_ms.insert(month.to_string(), (months.len() - i) as u64 * 40);
        }

        let started = std::time::Instant::now();
        let rows = compute_monthly_water_area(&source, &query(), d(2024, 1, 1), d(2024, 5, 31), 4)
            .await
            .unwrap();

        let counts: Vec<_> = rows.iter().map(|r| r.pixel_count).collect();
        assert_eq!(counts, vec![0, 10, 20, 30, 40]);
        // Sequential execution would take 200 + 160 + 120 + 80 + 40 ms
        assert!(started.elapsed() < std::time::Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_area_uses_dataset_scale() {
        let mut source = ScriptedSource::default();
        source.sums.insert("2024-06".to_string(), Some(10.0));
        let mut query = query();
        query.dataset.scale_m = 20.0;

        let rows = compute_monthly_water_area(&source, &query, d(2024, 6, 1), d(2024, 6, 30), 1)
            .await
            .unwrap();

        assert_eq!(rows[0].pixel_count, 10);
        assert_eq!(rows[0].area_m2, 4000.0);
    }

    #[tokio::test]
    async fn test_inverted_range_yields_no_rows() {
        let source = ScriptedSource::default();
        let rows = compute_monthly_water_area(&source, &query(), d(2024, 5, 2), d(2024, 5, 1), 1)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}

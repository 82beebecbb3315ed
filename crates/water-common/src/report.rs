//! Monthly result rows and the assembled report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aoi::BoundingBox;
use crate::errors::DashboardError;
use crate::months::MonthRange;
use crate::PIXEL_SCALE_M;

/// Column names of the CSV export.
pub const CSV_HEADER: [&str; 4] = ["month", "pixel_count", "area_m2", "area_km2"];

/// Water area for one month of the requested interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyWaterArea {
    /// Month label, `YYYY-MM`.
    pub month: String,

    /// Number of pixels whose monthly mean water probability exceeds the threshold.
    pub pixel_count: u64,

    /// `pixel_count * scale_m²` (`* 100.0` at the nominal 10 m).
    pub area_m2: f64,

    /// `area_m2 / 1e6`.
    pub area_km2: f64,
}

impl MonthlyWaterArea {
    /// Row for a month with the given pixel count at the nominal 10 m scale.
    pub fn from_pixel_count(range: &MonthRange, pixel_count: u64) -> Self {
        Self::from_pixel_count_at_scale(range, pixel_count, PIXEL_SCALE_M)
    }

    /// Row for pixels of `scale_m` by `scale_m` meters.
    pub fn from_pixel_count_at_scale(range: &MonthRange, pixel_count: u64, scale_m: f64) -> Self {
        let area_m2 = pixel_count as f64 * (scale_m * scale_m);
        Self {
            month: range.label(),
            pixel_count,
            area_m2,
            area_km2: area_m2 / 1e6,
        }
    }

    /// Zero-valued row, used for empty months and swallowed query failures.
    pub fn zero(range: &MonthRange) -> Self {
        Self::from_pixel_count(range, 0)
    }
}

/// Aggregate figures over all rows of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub month_count: usize,
    pub total_pixel_count: u64,
    pub mean_area_km2: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_month: Option<String>,

    pub max_area_km2: f64,
}

impl ReportSummary {
    pub fn from_rows(rows: &[MonthlyWaterArea]) -> Self {
        let total_pixel_count = rows.iter().map(|r| r.pixel_count).sum();
        let mean_area_km2 = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|r| r.area_km2).sum::<f64>() / rows.len() as f64
        };
        // First month wins on ties
        let max = rows.iter().fold(None::<&MonthlyWaterArea>, |best, r| match best {
            Some(b) if b.area_km2 >= r.area_km2 => Some(b),
            _ => Some(r),
        });

        Self {
            month_count: rows.len(),
            total_pixel_count,
            mean_area_km2,
            max_month: max.map(|r| r.month.clone()),
            max_area_km2: max.map(|r| r.area_km2).unwrap_or(0.0),
        }
    }
}

/// Result of one dashboard run: the inputs echoed back plus the monthly table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterAreaReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub center_lat: f64,
    pub center_lon: f64,
    pub side_km: f64,
    pub threshold: f64,
    pub bbox: BoundingBox,
    pub months: Vec<MonthlyWaterArea>,
    pub summary: ReportSummary,
}

impl WaterAreaReport {
    /// CSV rendering of the monthly table, one record per month after the header.
    pub fn to_csv(&self) -> Result<String, DashboardError> {
        let csv_error = |e: &dyn std::fmt::Display| {
            DashboardError::InternalError(format!("CSV export failed: {}", e))
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADER).map_err(|e| csv_error(&e))?;
        for row in &self.months {
            writer.serialize(row).map_err(|e| csv_error(&e))?;
        }

        let bytes = writer.into_inner().map_err(|e| csv_error(&e))?;
        String::from_utf8(bytes).map_err(|e| csv_error(&e))
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(y: i32, m: u32) -> MonthRange {
        let start = NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        MonthRange {
            start,
            end: crate::months::first_of_next_month(start),
        }
    }

    fn report(rows: Vec<MonthlyWaterArea>) -> WaterAreaReport {
        WaterAreaReport {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 8, 31).unwrap(),
            center_lat: 18.405,
            center_lon: 73.585,
            side_km: 2.0,
            threshold: 0.5,
            bbox: BoundingBox::square(18.405, 73.585, 2.0),
            summary: ReportSummary::from_rows(&rows),
            months: rows,
        }
    }

    #[test]
    fn test_area_is_pixel_count_times_100() {
        for count in [0_u64, 1, 7, 12_345, 40_000, 9_999_999] {
            let row = MonthlyWaterArea::from_pixel_count(&range(2024, 6), count);
            assert_eq!(row.area_m2, count as f64 * 100.0);
            assert_eq!(row.area_km2, row.area_m2 / 1e6);
        }
    }

    #[test]
    fn test_zero_row() {
        let row = MonthlyWaterArea::zero(&range(2025, 1));
        assert_eq!(row.month, "2025-01");
        assert_eq!(row.pixel_count, 0);
        assert_eq!(row.area_m2, 0.0);
    }

    #[test]
    fn test_summary() {
        let rows = vec![
            MonthlyWaterArea::from_pixel_count(&range(2024, 6), 10_000),
            MonthlyWaterArea::from_pixel_count(&range(2024, 7), 30_000),
            MonthlyWaterArea::from_pixel_count(&range(2024, 8), 20_000),
        ];
        let summary = ReportSummary::from_rows(&rows);

        assert_eq!(summary.month_count, 3);
        assert_eq!(summary.total_pixel_count, 60_000);
        assert_eq!(summary.max_month.as_deref(), Some("2024-07"));
        assert!((summary.max_area_km2 - 3.0).abs() < 1e-12);
        assert!((summary.mean_area_km2 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_of_empty_rows() {
        let summary = ReportSummary::from_rows(&[]);
        assert_eq!(summary.month_count, 0);
        assert_eq!(summary.max_month, None);
        assert_eq!(summary.mean_area_km2, 0.0);
    }

    #[test]
    fn test_area_follows_scale() {
        let row = MonthlyWaterArea::from_pixel_count_at_scale(&range(2024, 6), 10, 20.0);
        assert_eq!(row.area_m2, 4000.0);
        assert_eq!(row.area_km2, 0.004);
        assert_eq!(
            MonthlyWaterArea::from_pixel_count_at_scale(&range(2024, 6), 10, PIXEL_SCALE_M),
            MonthlyWaterArea::from_pixel_count(&range(2024, 6), 10)
        );
    }

    #[test]
    fn test_csv() {
        let r = report(vec![
            MonthlyWaterArea::from_pixel_count(&range(2024, 6), 12),
            MonthlyWaterArea::zero(&range(2024, 7)),
        ]);
        let csv = r.to_csv().unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "month,pixel_count,area_m2,area_km2");
        assert_eq!(lines[1], "2024-06,12,1200.0,0.0012");
        assert_eq!(lines[2], "2024-07,0,0.0,0.0");
    }

    #[test]
    fn test_csv_of_empty_report_has_header() {
        let csv = report(Vec::new()).to_csv().unwrap();
        assert_eq!(csv, "month,pixel_count,area_m2,area_km2\n");
    }

    #[test]
    fn test_csv_reads_back() {
        let rows = vec![
            MonthlyWaterArea::from_pixel_count(&range(2024, 6), 12_345),
            MonthlyWaterArea::from_pixel_count(&range(2024, 7), 1),
        ];
        let csv = report(rows.clone()).to_csv().unwrap();

        let parsed: Vec<MonthlyWaterArea> = csv::Reader::from_reader(csv.as_bytes())
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(parsed, rows);
    }
}

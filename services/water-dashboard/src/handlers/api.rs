//! JSON API handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use tower_sessions::Session;
use water_common::{month_ranges, BoundingBox, DashboardError};

use super::{error_response, require_session};
use crate::params::{parse_date_range, AoiInputs, InputParams, RunInputs};
use crate::run::run_report;
use crate::state::AppState;

/// Response of `GET /api/aoi`.
#[derive(Debug, Serialize)]
pub struct AoiResponse {
    pub center_lat: f64,
    pub center_lon: f64,
    pub side_km: f64,
    pub bbox: BoundingBox,
    pub geometry: serde_json::Value,
}

/// One entry of `GET /api/months`.
#[derive(Debug, Serialize)]
pub struct MonthEntry {
    pub month: String,
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    pub days: i64,
}

#[derive(Debug, Serialize)]
pub struct MonthsResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub months: Vec<MonthEntry>,
}

/// Output format of `GET /api/water-area`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    pub fn parse(raw: Option<&str>) -> Result<Self, DashboardError> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("json") => Ok(ReportFormat::Json),
            Some("csv") => Ok(ReportFormat::Csv),
            Some(other) => Err(DashboardError::InvalidParameter(format!(
                "f must be 'json' or 'csv', got '{}'",
                other
            ))),
        }
    }
}

/// GET /api/aoi
pub async fn aoi_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<InputParams>,
    session: Session,
) -> Response {
    if let Err(e) = require_session(&session).await {
        return error_response(&e);
    }

    match AoiInputs::parse(&params, &state.config.defaults) {
        Ok(aoi) => {
            let bbox = aoi.bbox();
            Json(AoiResponse {
                center_lat: aoi.center_lat,
                center_lon: aoi.center_lon,
                side_km: aoi.side_km,
                geometry: bbox.to_geojson_polygon(),
                bbox,
            })
            .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /api/months
pub async fn months_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<InputParams>,
    session: Session,
) -> Response {
    if let Err(e) = require_session(&session).await {
        return error_response(&e);
    }

    match parse_date_range(&params, &state.config.defaults) {
        Ok((start_date, end_date)) => {
            let months = month_ranges(start_date, end_date)
                .map(|range| MonthEntry {
                    month: range.label(),
                    start: range.start,
                    end: range.end,
                    days: range.days(),
                })
                .collect();
            Json(MonthsResponse {
                start_date,
                end_date,
                months,
            })
            .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /api/water-area
pub async fn water_area_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<InputParams>,
    session: Session,
) -> Response {
    if let Err(e) = require_session(&session).await {
        return error_response(&e);
    }

    let format = match ReportFormat::parse(params.f.as_deref()) {
        Ok(format) => format,
        Err(e) => return error_response(&e),
    };
    let inputs = match RunInputs::parse(&params, &state.config.defaults) {
        Ok(inputs) => inputs,
        Err(e) => return error_response(&e),
    };

    let report = match run_report(&state, &inputs).await {
        Ok(report) => report,
        Err(e) => return error_response(&e),
    };

    match format {
        ReportFormat::Json => Json(report).into_response(),
        ReportFormat::Csv => {
            let csv = match report.to_csv() {
                Ok(csv) => csv,
                Err(e) => return error_response(&e),
            };
            let filename = format!(
                "water_area_{}_{}.csv",
                report.start_date.format("%Y%m%d"),
                report.end_date.format("%Y%m%d")
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                csv,
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_parse() {
        assert_eq!(ReportFormat::parse(None).unwrap(), ReportFormat::Json);
        assert_eq!(ReportFormat::parse(Some("")).unwrap(), ReportFormat::Json);
        assert_eq!(ReportFormat::parse(Some("JSON")).unwrap(), ReportFormat::Json);
        assert_eq!(ReportFormat::parse(Some("csv")).unwrap(), ReportFormat::Csv);
        assert!(matches!(
            ReportFormat::parse(Some("xml")),
            Err(DashboardError::InvalidParameter(_))
        ));
    }
}

//! Parsing and validation of dashboard inputs.
//!
//! All inputs arrive as optional query-string values. Missing or blank values
//! fall back to the configured defaults; present values must parse and fall in
//! range.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use water_common::{BoundingBox, DashboardError, MIN_SIDE_KM};

use crate::config::InputDefaults;

/// Raw query parameters shared by the page and the JSON API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputParams {
    /// Start date, `YYYY-MM-DD`.
    pub start: Option<String>,

    /// End date (inclusive), `YYYY-MM-DD`.
    pub end: Option<String>,

    /// Center latitude in decimal degrees.
    pub lat: Option<String>,

    /// Center longitude in decimal degrees.
    pub lon: Option<String>,

    /// Side of the square AOI in kilometers.
    pub side_km: Option<String>,

    /// Water probability threshold in [0, 1].
    pub threshold: Option<String>,

    /// Output format (`json` or `csv`).
    pub f: Option<String>,
}

/// Validated inputs of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInputs {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub aoi: AoiInputs,
    pub threshold: f64,
}

/// Validated AOI inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AoiInputs {
    pub center_lat: f64,
    pub center_lon: f64,
    pub side_km: f64,
}

impl AoiInputs {
    pub fn parse(params: &InputParams, defaults: &InputDefaults) -> Result<Self, DashboardError> {
        let center_lat = parse_number("lat", params.lat.as_deref(), defaults.center_lat)?;
        let center_lon = parse_number("lon", params.lon.as_deref(), defaults.center_lon)?;
        let side_km = parse_number("side_km", params.side_km.as_deref(), defaults.side_km)?;

        if !(-90.0..=90.0).contains(&center_lat) {
            return Err(DashboardError::InvalidParameter(format!(
                "lat must be between -90 and 90, got {}",
                center_lat
            )));
        }
        if !(-180.0..=180.0).contains(&center_lon) {
            return Err(DashboardError::InvalidParameter(format!(
                "lon must be between -180 and 180, got {}",
                center_lon
            )));
        }
        if side_km < MIN_SIDE_KM {
            return Err(DashboardError::InvalidParameter(format!(
                "side_km must be at least {}, got {}",
                MIN_SIDE_KM, side_km
            )));
        }

        Ok(Self {
            center_lat,
            center_lon,
            side_km,
        })
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::square(self.center_lat, self.center_lon, self.side_km)
    }
}

impl RunInputs {
    pub fn parse(params: &InputParams, defaults: &InputDefaults) -> Result<Self, DashboardError> {
        let (start_date, end_date) = parse_date_range(params, defaults)?;
        let aoi = AoiInputs::parse(params, defaults)?;
        let threshold = parse_number("threshold", params.threshold.as_deref(), defaults.threshold)?;

        if !(0.0..=1.0).contains(&threshold) {
            return Err(DashboardError::InvalidParameter(format!(
                "threshold must be between 0 and 1, got {}",
                threshold
            )));
        }

        Ok(Self {
            start_date,
            end_date,
            aoi,
            threshold,
        })
    }
}

/// Parse `start`/`end`, rejecting a start after the end and ranges longer
/// than `defaults.max_months` calendar months.
pub fn parse_date_range(
    params: &InputParams,
    defaults: &InputDefaults,
) -> Result<(NaiveDate, NaiveDate), DashboardError> {
    let start = parse_date("start", params.start.as_deref(), defaults.start_date)?;
    let end = parse_date("end", params.end.as_deref(), defaults.end_date)?;

    if start > end {
        return Err(DashboardError::InvalidDateRange);
    }

    let months = months_spanned(start, end);
    if months > i64::from(defaults.max_months) {
        return Err(DashboardError::InvalidParameter(format!(
            "date range spans {} months, at most {} are allowed",
            months, defaults.max_months
        )));
    }
    Ok((start, end))
}

/// Number of calendar months touched by `[start, end]`.
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> i64 {
    let years = i64::from(end.year() - start.year());
    years * 12 + i64::from(end.month()) - i64::from(start.month()) + 1
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(
    name: &str,
    raw: Option<&str>,
    default: NaiveDate,
) -> Result<NaiveDate, DashboardError> {
    match present(raw) {
        None => Ok(default),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            DashboardError::InvalidParameter(format!(
                "{} must be a date in YYYY-MM-DD form, got '{}'",
                name, value
            ))
        }),
    }
}

fn parse_number(name: &str, raw: Option<&str>, default: f64) -> Result<f64, DashboardError> {
    match present(raw) {
        None => Ok(default),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                DashboardError::InvalidParameter(format!(
                    "{} must be a number, got '{}'",
                    name, value
                ))
            }),
    }
}

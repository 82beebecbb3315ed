//! Shared types for the monthly surface-water dashboard.
//!
//! This crate holds everything that can be computed locally:
//! - Square area-of-interest construction from a center point and side length
//! - Partitioning of an inclusive date interval into calendar months
//! - Monthly result rows and the assembled report
//! - The error taxonomy shared by the client and the HTTP service
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use water_common::{month_ranges, BoundingBox};
//!
//! let aoi = BoundingBox::square(18.405, 73.585, 2.0);
//! assert!(aoi.contains(73.585, 18.405));
//!
//! let start = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
//! assert_eq!(month_ranges(start, end).count(), 2);
//! ```

pub mod aoi;
pub mod errors;
pub mod months;
pub mod report;
pub mod responses;

pub use aoi::{km_to_deg_lat, km_to_deg_lon, BoundingBox};
pub use errors::DashboardError;
pub use months::{month_ranges, MonthRange, MonthRanges};
pub use report::{MonthlyWaterArea, ReportSummary, WaterAreaReport, CSV_HEADER};
pub use responses::ExceptionResponse;

/// Kilometers per degree of latitude in the fixed-radius approximation.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Nominal ground resolution of the water probability raster, in meters.
pub const PIXEL_SCALE_M: f64 = 10.0;

/// Smallest AOI side length accepted from a request, in kilometers.
pub const MIN_SIDE_KM: f64 = 0.5;

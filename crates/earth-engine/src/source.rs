//! The seam between the monthly driver and the remote service.

use async_trait::async_trait;
use water_common::MonthRange;

use crate::error::Result;
use crate::query::WaterQuery;

/// Something that can answer the two per-month questions of a water-area run.
///
/// Implementations are read-only and hold no per-run state, so calls for
/// different months may be issued concurrently.
#[async_trait]
pub trait WaterAreaSource: Send + Sync {
    /// Prepare the remote session (e.g. obtain credentials).
    ///
    /// A failure here aborts the whole run.
    async fn ensure_ready(&self) -> Result<()>;

    /// Number of images matching the AOI and month.
    async fn image_count(&self, query: &WaterQuery, month: &MonthRange) -> Result<u64>;

    /// Count of pixels above threshold, as returned by the reduction.
    ///
    /// Returns `None` when the reduction produced no value.
    async fn water_pixel_count(&self, query: &WaterQuery, month: &MonthRange)
        -> Result<Option<f64>>;

    /// Short human-readable description for logs and readiness output.
    fn describe(&self) -> String;
}

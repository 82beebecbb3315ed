//! One dashboard run: inputs in, monthly report out.

use std::time::Instant;

use earth_engine::{compute_monthly_water_area, WaterQuery};
use metrics::{counter, histogram};
use tracing::{error, info};
use water_common::{DashboardError, ReportSummary, WaterAreaReport};

use crate::params::RunInputs;
use crate::state::AppState;

/// Query every month of the requested interval and assemble the report.
///
/// Only a failure to initialise the remote session is an error; individual
/// months degrade to zero rows.
pub async fn run_report(
    state: &AppState,
    inputs: &RunInputs,
) -> Result<WaterAreaReport, DashboardError> {
    let started = Instant::now();
    counter!("water_dashboard_runs_total").increment(1);

    let bbox = inputs.aoi.bbox();
    let query = WaterQuery::new(bbox, inputs.threshold).with_dataset(state.config.dataset.clone());

    let months = compute_monthly_water_area(
        state.source.as_ref(),
        &query,
        inputs.start_date,
        inputs.end_date,
        state.max_concurrent_queries,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "Remote service initialisation failed");
        DashboardError::RemoteInit(e.to_string())
    })?;

    let elapsed = started.elapsed();
    histogram!("water_dashboard_run_duration_seconds").record(elapsed.as_secs_f64());
    info!(
        months = months.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Run complete"
    );

    Ok(WaterAreaReport {
        start_date: inputs.start_date,
        end_date: inputs.end_date,
        center_lat: inputs.aoi.center_lat,
        center_lon: inputs.aoi.center_lon,
        side_km: inputs.aoi.side_km,
        threshold: inputs.threshold,
        bbox,
        summary: ReportSummary::from_rows(&months),
        months,
    })
}

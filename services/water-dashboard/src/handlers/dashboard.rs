//! Dashboard page handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::warn;

use super::require_session;
use crate::html::{self, DashboardView, FormValues};
use crate::params::{AoiInputs, InputParams, RunInputs};
use crate::run::run_report;
use crate::state::AppState;

/// GET /
///
/// Renders the form, and runs the monthly computation whenever the inputs
/// validate. Validation and initialisation errors are shown in the page.
pub async fn dashboard_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<InputParams>,
    session: Session,
) -> Response {
    let Ok(username) = require_session(&session).await else {
        return Redirect::to("/login").into_response();
    };

    let defaults = &state.config.defaults;
    let mut view = DashboardView {
        site_name: &state.config.site_name,
        username: &username,
        map: &state.config.map,
        form: FormValues::from_params(&params, defaults),
        side_km: defaults.side_km,
        error: None,
        aoi: None,
        report: None,
    };

    match AoiInputs::parse(&params, defaults) {
        Ok(aoi) => {
            view.side_km = aoi.side_km;
            view.aoi = Some((aoi.center_lat, aoi.center_lon, aoi.bbox()));
        }
        Err(e) => view.error = Some(e.to_string()),
    }

    if view.error.is_none() {
        let outcome = match RunInputs::parse(&params, defaults) {
            Ok(inputs) => run_report(&state, &inputs).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(report) => view.report = Some(report),
            Err(e) => {
                warn!(error = %e, "Dashboard run failed");
                view.error = Some(e.to_string());
            }
        }
    }

    Html(html::dashboard_page(&view)).into_response()
}

//! Login and logout handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use metrics::counter;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};

use super::error_response;
use crate::html;
use crate::session::{current_user, log_in, log_out};
use crate::state::AppState;

/// Message shown after a rejected login.
pub const INVALID_LOGIN: &str = "Invalid username or password";

/// Submitted login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /login
pub async fn login_form_handler(session: Session) -> Response {
    if let Ok(Some(_)) = current_user(&session).await {
        return Redirect::to("/").into_response();
    }
    Html(html::login_page(None)).into_response()
}

/// POST /login
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if !state.config.login.accepts(&form.username, &form.password) {
        counter!("water_dashboard_logins_total", "outcome" => "failure").increment(1);
        warn!(username = %form.username, "Rejected login");
        return (
            StatusCode::UNAUTHORIZED,
            Html(html::login_page(Some(INVALID_LOGIN))),
        )
            .into_response();
    }

    if let Err(e) = log_in(&session, &form.username).await {
        return error_response(&e);
    }
    counter!("water_dashboard_logins_total", "outcome" => "success").increment(1);
    info!(username = %form.username, "Logged in");

    Redirect::to("/").into_response()
}

/// POST /logout
pub async fn logout_handler(session: Session) -> Response {
    if let Ok(Some(username)) = current_user(&session).await {
        info!(username = %username, "Logged out");
    }
    if let Err(e) = log_out(&session).await {
        return error_response(&e);
    }

    Redirect::to("/login").into_response()
}

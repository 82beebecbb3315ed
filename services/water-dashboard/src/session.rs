//! Login sessions for the demo gate.
//!
//! Sessions live in an in-memory cache keyed by the id carried in the
//! `wd_session` cookie. Records are evicted after `login.session_ttl_secs`
//! of inactivity, and the cache holds at most `login.max_sessions` of them.

use time::Duration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;
use water_common::DashboardError;

use crate::config::LoginConfig;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "wd_session";

/// Session key holding the logged-in username.
pub const USER_KEY: &str = "username";

/// Session middleware for the router.
pub fn session_layer(login: &LoginConfig) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(MokaStore::new(Some(login.max_sessions)))
        .with_name(SESSION_COOKIE)
        .with_same_site(SameSite::Lax)
        .with_secure(login.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            login.session_ttl_secs.max(1),
        )))
}

/// Username of the logged-in user, if the session has one.
pub async fn current_user(session: &Session) -> Result<Option<String>, DashboardError> {
    session.get::<String>(USER_KEY).await.map_err(store_error)
}

/// Mark the session as logged in as `username`, under a fresh id.
pub async fn log_in(session: &Session, username: &str) -> Result<(), DashboardError> {
    session
        .insert(USER_KEY, username.to_string())
        .await
        .map_err(store_error)?;
    session.cycle_id().await.map_err(store_error)
}

/// Drop the session's data and its store record.
pub async fn log_out(session: &Session) -> Result<(), DashboardError> {
    session.flush().await.map_err(store_error)
}

fn store_error(e: tower_sessions::session::Error) -> DashboardError {
    DashboardError::InternalError(format!("session store: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn session() -> Session {
        Session::new(None, Arc::new(MokaStore::new(Some(16))), None)
    }

    #[tokio::test]
    async fn test_log_in_and_out() {
        let session = session();
        assert_eq!(current_user(&session).await.unwrap(), None);

        log_in(&session, "ndsa").await.unwrap();
        assert_eq!(current_user(&session).await.unwrap().as_deref(), Some("ndsa"));

        log_out(&session).await.unwrap();
        assert_eq!(current_user(&session).await.unwrap(), None);
    }
}

//! Cookie sessions on top of `tower-sessions`.
//!
//! The manager layer owns the cookie and the store round-trips; this module
//! fixes the cookie attributes and the one key TaraNote keeps in a session.

use std::time::Duration;

use tower_sessions::{cookie::SameSite, Expiry, Session, SessionManagerLayer, SessionStore};
use uuid::Uuid;

use taranote_core::{Error, Result};

use crate::AppConfig;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "taranote_session";

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";

/// Upper bound on the configured inactivity window.
const MAX_SESSION_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Session manager for `store`: `HttpOnly`, `SameSite=Lax`, path `/`, and
/// expiry on `session_ttl` of inactivity.
pub fn layer<Store>(store: Store, config: &AppConfig) -> SessionManagerLayer<Store>
where
    Store: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_path("/")
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.session_cookie_secure)
        .with_expiry(Expiry::OnInactivity(inactivity(config.session_ttl)))
}

fn inactivity(ttl: Duration) -> time::Duration {
    let secs = ttl.min(MAX_SESSION_TTL).as_secs();
    time::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}

/// The user id bound to `session`, if any.
///
/// A store failure is an error, never an anonymous session.
pub async fn user_id(session: &Session) -> Result<Option<Uuid>> {
    session.get::<Uuid>(USER_ID_KEY).await.map_err(session_error)
}

/// Bind `user_id` to a session under a freshly issued id.
pub async fn start(session: &Session, user_id: Uuid) -> Result<()> {
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(USER_ID_KEY, user_id)
        .await
        .map_err(session_error)
}

/// Drop the session from the store. The manager then clears the cookie.
pub async fn end(session: &Session) -> Result<()> {
    session.flush().await.map_err(session_error)
}

fn session_error(err: tower_sessions::session::Error) -> Error {
    Error::Session(err.to_string())
}

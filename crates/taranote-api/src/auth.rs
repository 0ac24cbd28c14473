//! Session-based authorization gate.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::{debug, warn};

use taranote_core::logging::subsystem;
use taranote_core::{Result, User};

use crate::inertia::is_inertia_request;
use crate::{found, session, ApiError, AppState};

/// Where anonymous browser requests are sent.
pub const LOGIN_PATH: &str = "/login";

/// Resolve the session to a live user.
///
/// `Ok(None)` covers a missing cookie, an unknown or expired session, and a
/// session whose user is gone or soft-deleted. Store failures are errors,
/// never anonymous.
pub async fn resolve(state: &AppState, session: &Session) -> Result<Option<User>> {
    let Some(user_id) = session::user_id(session).await? else {
        return Ok(None);
    };
    state.db.users.find_by_id(user_id).await
}

/// Middleware guarding admin routes.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve(&state, &session).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Ok(None) => {
            debug!(
                subsystem = subsystem::AUTH,
                component = "gate",
                path = request.uri().path(),
                "Anonymous request rejected"
            );
            unauthenticated_response(request.uri().path(), request.headers())
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Response for an anonymous request to a guarded route.
///
/// Client-router navigations and plain browser requests are redirected to
/// the login page; API and XHR callers get a JSON 401.
pub fn unauthenticated_response(path: &str, headers: &HeaderMap) -> Response {
    if is_inertia_request(headers) {
        return found(LOGIN_PATH);
    }
    if wants_json(path, headers) {
        return ApiError::Unauthorized.into_response();
    }
    found(LOGIN_PATH)
}

fn wants_json(path: &str, headers: &HeaderMap) -> bool {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let is_api = path == "/api" || path.starts_with("/api/");
    let json_body = header_str("content-type")
        .is_some_and(|ct| ct.trim_start().starts_with("application/json"));
    let json_only = header_str("accept").is_some_and(|accept| {
        let mut types = accept.split(',').map(|t| t.split(';').next().unwrap_or("").trim());
        types.all(|t| t == "application/json")
    });
    let xhr = header_str("x-requested-with").is_some_and(|v| v == "XMLHttpRequest");

    is_api || json_body || json_only || xhr
}

/// The authenticated user, attached by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

/// Best-effort current user for public pages.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        if let Some(CurrentUser(user)) = parts.extensions.get::<CurrentUser>() {
            return Ok(OptionalUser(Some(user.clone())));
        }
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(OptionalUser(None));
        };
        match resolve(state, &session).await {
            Ok(user) => Ok(OptionalUser(user)),
            Err(err) => {
                warn!(subsystem = subsystem::AUTH, error = %err, "Current user lookup failed");
                Ok(OptionalUser(None))
            }
        }
    }
}

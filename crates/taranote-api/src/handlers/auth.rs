//! Login and logout.

use axum::{
    extract::{FromRequest, Request, State},
    http::header,
    response::Response,
    Form, Json,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};

use taranote_core::logging::subsystem;

use crate::error::rejection;
use crate::inertia::Inertia;
use crate::{found, session, ApiError, AppState};

/// Where a successful login lands.
pub const AFTER_LOGIN_PATH: &str = "/dashboard";

/// Login payload, accepted as JSON or as a url-encoded form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequest<S> for LoginForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"));

        if is_json {
            let Json(form) = Json::<LoginForm>::from_request(req, state)
                .await
                .map_err(|r| rejection(r.status(), r.body_text()))?;
            Ok(form)
        } else {
            let Form(form) = Form::<LoginForm>::from_request(req, state)
                .await
                .map_err(|r| rejection(r.status(), r.body_text()))?;
            Ok(form)
        }
    }
}

pub async fn show_login(inertia: Inertia) -> Response {
    inertia.render("Auth/Login", serde_json::json!({})).await
}

/// Verify credentials, start a fresh session and redirect to the dashboard.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    form: LoginForm,
) -> Result<Response, ApiError> {
    let user = state.auth.authenticate(&form.email, &form.password).await?;

    // A new id on every login; a pre-login session id is never promoted.
    session::start(&session, user.id).await?;

    info!(subsystem = subsystem::AUTH, op = "login", user_id = %user.id, "Session started");
    Ok(found(AFTER_LOGIN_PATH))
}

/// Destroy the session and go home. The session layer clears the cookie.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = session::end(&session).await {
        warn!(subsystem = subsystem::AUTH, op = "logout", error = %e, "Failed to destroy session");
    }
    found("/")
}

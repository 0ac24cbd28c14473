//! JSON error responses for API routes.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use taranote_core::logging::subsystem;
use taranote_core::{Error, FieldErrors};

/// Message shared by every failed login.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug)]
pub enum ApiError {
    /// Storage, session or I/O failure. Details are logged, not returned.
    Internal(Error),
    Unauthorized,
    NotFound(String),
    BadRequest(String),
    Validation(FieldErrors),
    InvalidCredentials,
    Conflict(String),
    PayloadTooLarge,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Validation(fields) => ApiError::Validation(fields),
            Error::InvalidCredentials => ApiError::InvalidCredentials,
            Error::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Internal(err) => {
                error!(subsystem = subsystem::API, error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "errors": fields }),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "message": INVALID_CREDENTIALS,
                    "errors": { "email": INVALID_CREDENTIALS },
                }),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "Payload too large" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Map an extractor rejection onto the JSON error contract.
///
/// Oversized bodies keep their 413; everything else is a 400.
pub fn rejection(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(message)
    }
}

/// `Json` extractor whose rejections are reported as [`ApiError`].
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|r| rejection(r.status(), r.body_text()))?;
        Ok(JsonBody(value))
    }
}

/// `/:id` path segment parsed as a UUID.
pub struct PathId(pub Uuid);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PathId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|r| rejection(r.status(), r.body_text()))?;
        Ok(PathId(id))
    }
}

/// `Query` extractor whose rejections are reported as [`ApiError`].
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|r| rejection(r.status(), r.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// Give a plain-text 413 from the body limit layer the JSON error shape.
pub async fn payload_too_large_as_json(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return ApiError::PayloadTooLarge.into_response();
    }
    response
}

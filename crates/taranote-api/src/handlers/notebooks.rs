//! Admin API: notebooks.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use taranote_core::NotebookInput;

use crate::auth::CurrentUser;
use crate::error::{JsonBody, PathId};
use crate::handlers::Data;
use crate::{ApiError, AppState};

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let notebooks = state.notebooks.list(user.id).await?;
    Ok(Json(Data { data: notebooks }))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(input): JsonBody<NotebookInput>,
) -> Result<impl IntoResponse, ApiError> {
    let notebook = state.notebooks.create(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(Data { data: notebook })))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    PathId(id): PathId,
    JsonBody(input): JsonBody<NotebookInput>,
) -> Result<impl IntoResponse, ApiError> {
    let notebook = state.notebooks.update(user.id, id, input).await?;
    Ok(Json(Data { data: notebook }))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError> {
    state.notebooks.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

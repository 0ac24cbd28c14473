//! Admin API: notes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use taranote_core::{CreateNoteInput, UpdateNoteInput};

use crate::auth::CurrentUser;
use crate::error::{JsonBody, PathId, QueryParams};
use crate::services::notes::NoteQuery;
use crate::{ApiError, AppState};

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    QueryParams(query): QueryParams<NoteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.notes.list(user.id, query).await?;
    Ok(Json(notes))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.get(user.id, id).await?;
    Ok(Json(note))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(input): JsonBody<CreateNoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.create(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    PathId(id): PathId,
    JsonBody(input): JsonBody<UpdateNoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.update(user.id, id, input).await?;
    Ok(Json(note))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError> {
    state.notes.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Admin API: site settings.

use axum::{extract::State, response::IntoResponse, Json};

use taranote_core::SettingUpdate;

use crate::error::JsonBody;
use crate::handlers::Message;
use crate::{ApiError, AppState};

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.settings.list().await?))
}

/// Body: `[{"key": ..., "value": ...}, ...]`.
pub async fn update(
    State(state): State<AppState>,
    JsonBody(updates): JsonBody<Vec<SettingUpdate>>,
) -> Result<impl IntoResponse, ApiError> {
    state.settings.update_batch(updates).await?;
    Ok(Json(Message {
        message: "Settings updated successfully",
    }))
}

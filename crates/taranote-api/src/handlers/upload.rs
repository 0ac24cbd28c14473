//! Admin API: image uploads for editor content and cover images.

use std::path::Path;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use taranote_core::logging::subsystem;
use taranote_core::Error;

use crate::auth::CurrentUser;
use crate::error::rejection;
use crate::{ApiError, AppState};

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Store the `file` field as `{uuid}{ext}` and return its public URL.
pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|r| rejection(r.status(), r.body_text()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejection(e.status(), e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = format!(
            "{}{}",
            Uuid::now_v7(),
            extension(field.file_name().unwrap_or_default())
        );
        let bytes = field
            .bytes()
            .await
            .map_err(|e| rejection(e.status(), e.body_text()))?;

        let dir = &state.config.upload_dir;
        tokio::fs::create_dir_all(dir).await.map_err(Error::Io)?;
        tokio::fs::write(dir.join(&filename), &bytes)
            .await
            .map_err(Error::Io)?;

        info!(
            subsystem = subsystem::API,
            component = "upload",
            user_id = %user.id,
            file = %filename,
            bytes = bytes.len(),
            "File uploaded"
        );
        return Ok(Json(UploadResponse {
            url: format!("{}/{}", state.config.upload_url_prefix, filename),
        }));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

/// `.ext` of the client file name, lower-cased; empty unless alphanumeric.
fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

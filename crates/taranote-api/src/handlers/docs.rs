//! Markdown documentation pages served from the docs directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use tracing::debug;

use taranote_core::logging::subsystem;
use taranote_core::Error;

use crate::auth::OptionalUser;
use crate::handlers::AuthProps;
use crate::inertia::Inertia;
use crate::AppState;

/// Page shown when no path is given.
pub const INDEX_PAGE: &str = "INDEX";

const NOT_FOUND_CONTENT: &str =
    "# 404 Not Found\n\nThe requested documentation page could not be found.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocProps<'a> {
    content: &'a str,
    current_path: &'a str,
    display_name: &'a str,
    auth: AuthProps<'a>,
}

pub async fn index(
    State(state): State<AppState>,
    user: OptionalUser,
    inertia: Inertia,
) -> Response {
    render_doc(&state, user, inertia, "").await
}

pub async fn page(
    State(state): State<AppState>,
    Path(path): Path<String>,
    user: OptionalUser,
    inertia: Inertia,
) -> Response {
    render_doc(&state, user, inertia, &path).await
}

async fn render_doc(
    state: &AppState,
    OptionalUser(user): OptionalUser,
    inertia: Inertia,
    raw_path: &str,
) -> Response {
    let path = match raw_path.trim_matches('/') {
        "" => INDEX_PAGE,
        path => path,
    };
    if path.contains("..") {
        return inertia
            .error(Error::InvalidInput("Invalid path".to_string()))
            .await;
    }

    let auth = AuthProps::new(user.as_ref());
    for candidate in candidates(&state.config.docs_dir, path) {
        match tokio::fs::read_to_string(&candidate).await {
            Ok(content) => {
                let display_name = display_name(path);
                return inertia
                    .render(
                        "Docs",
                        DocProps {
                            content: &content,
                            current_path: path,
                            display_name: &display_name,
                            auth,
                        },
                    )
                    .await;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return inertia.error(Error::Io(e)).await,
        }
    }

    debug!(subsystem = subsystem::DOCS, path, "Documentation page not found");
    inertia
        .render_with_status(
            StatusCode::NOT_FOUND,
            "Docs",
            DocProps {
                content: NOT_FOUND_CONTENT,
                current_path: path,
                display_name: "Not Found",
                auth,
            },
        )
        .await
}

/// `{path}.md`, then `{path}/README.md`.
fn candidates(docs_dir: &std::path::Path, path: &str) -> [PathBuf; 2] {
    [
        docs_dir.join(format!("{}.md", path)),
        docs_dir.join(path).join("README.md"),
    ]
}

/// `guides/getting_started` becomes `Getting Started`.
fn display_name(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    base.replace('_', " ")
        .to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

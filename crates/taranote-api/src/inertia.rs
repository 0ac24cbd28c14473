//! Dual-mode page rendering.
//!
//! Every page handler produces one envelope `{component, props, url, version}`.
//! Requests carrying `X-Inertia: true` get the envelope as JSON; everything
//! else gets an HTML shell that embeds the very same JSON string for the
//! client-side router to boot from.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use taranote_core::logging::subsystem;
use taranote_core::{Error, Result};

use crate::config::AssetMode;
use crate::AppState;

pub const X_INERTIA: &str = "x-inertia";
pub const X_INERTIA_VERSION: &str = "x-inertia-version";
pub const X_INERTIA_LOCATION: &str = "x-inertia-location";

/// Bundle entry point resolved from the dev server or the build manifest.
pub const ENTRY_POINT: &str = "resources/js/app.js";

/// The page envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub component: String,
    /// Insertion-ordered props.
    pub props: Map<String, Value>,
    pub url: String,
    pub version: String,
}

impl Page {
    /// Serialize for both response modes. `<`, `>` and `&` are written as
    /// JSON unicode escapes so the output can sit inside a `<script>` element.
    pub fn to_json(&self) -> Result<String> {
        let raw = serde_json::to_string(self)?;
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '<' => out.push_str("\\u003c"),
                '>' => out.push_str("\\u003e"),
                '&' => out.push_str("\\u0026"),
                c => out.push(c),
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct ManifestChunk {
    file: String,
    #[serde(default)]
    css: Vec<String>,
}

/// Builds HTML shells around page envelopes.
#[derive(Debug, Clone)]
pub struct Renderer {
    version: String,
    assets: AssetMode,
}

impl Renderer {
    pub fn new(version: impl Into<String>, assets: AssetMode) -> Self {
        Self {
            version: version.into(),
            assets,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Script and stylesheet tags for the page head.
    ///
    /// Manifest problems degrade to an HTML comment so pages still render.
    pub async fn asset_tags(&self) -> String {
        match &self.assets {
            AssetMode::Dev { server_url } => format!(
                "<script type=\"module\" src=\"{url}/@vite/client\"></script>\n\
                 <script type=\"module\" src=\"{url}/{entry}\"></script>",
                url = server_url,
                entry = ENTRY_POINT
            ),
            AssetMode::Manifest { path } => match self.manifest_tags(path).await {
                Ok(tags) => tags,
                Err(reason) => {
                    warn!(
                        subsystem = subsystem::RENDER,
                        manifest = %path.display(),
                        reason,
                        "Asset manifest unusable"
                    );
                    format!("<!-- {} -->", reason)
                }
            },
        }
    }

    async fn manifest_tags(&self, path: &Path) -> std::result::Result<String, &'static str> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|_| "asset manifest not found")?;
        let manifest: std::collections::HashMap<String, ManifestChunk> =
            serde_json::from_str(&raw).map_err(|_| "asset manifest is not valid JSON")?;
        let entry = manifest
            .get(ENTRY_POINT)
            .ok_or("asset manifest has no entry for resources/js/app.js")?;

        let mut tags = format!(
            "<script type=\"module\" src=\"/build/{}\"></script>",
            entry.file
        );
        for css in &entry.css {
            tags.push_str(&format!("\n<link rel=\"stylesheet\" href=\"/build/{}\">", css));
        }
        Ok(tags)
    }

    /// Full HTML document embedding the serialized envelope verbatim.
    pub fn html_document(&self, page_json: &str, asset_tags: &str) -> String {
        format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>TaraNote</title>\n\
             {tags}\n\
             </head>\n\
             <body>\n\
             <div id=\"app\" data-page-source=\"page-data\"></div>\n\
             <script type=\"application/json\" id=\"page-data\">{page}</script>\n\
             </body>\n\
             </html>\n",
            tags = asset_tags,
            page = page_json
        )
    }
}

/// Per-request render context.
#[derive(Debug, Clone)]
pub struct Inertia {
    is_inertia: bool,
    url: String,
    renderer: Arc<Renderer>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Inertia {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let is_inertia = is_inertia_request(&parts.headers);
        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        // Stale client bundle: force a full page load.
        if is_inertia && parts.method == Method::GET {
            let client_version = parts
                .headers
                .get(X_INERTIA_VERSION)
                .and_then(|v| v.to_str().ok());
            if let Some(client_version) = client_version {
                if client_version != state.renderer.version() {
                    debug!(
                        subsystem = subsystem::RENDER,
                        client_version,
                        server_version = state.renderer.version(),
                        "Asset version mismatch"
                    );
                    let mut response = StatusCode::CONFLICT.into_response();
                    if let Ok(location) = HeaderValue::from_str(&url) {
                        response.headers_mut().insert(X_INERTIA_LOCATION, location);
                    }
                    return Err(response);
                }
            }
        }

        Ok(Self {
            is_inertia,
            url,
            renderer: state.renderer.clone(),
        })
    }
}

/// Whether the request asks for the JSON envelope.
pub fn is_inertia_request(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(X_INERTIA)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

impl Inertia {
    /// Render `component` with `props`, which must serialize to a JSON object.
    pub async fn render(&self, component: &str, props: impl Serialize) -> Response {
        self.render_with_status(StatusCode::OK, component, props)
            .await
    }

    /// Render the `Error` component for a failed page request.
    pub async fn error(&self, err: Error) -> Response {
        let (status, message) = match &err {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            Error::InvalidInput(_) | Error::Validation(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            _ => {
                error!(subsystem = subsystem::RENDER, error = %err, "Page request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
        };
        self.render_with_status(
            status,
            "Error",
            serde_json::json!({ "status": status.as_u16(), "message": message }),
        )
        .await
    }

    pub async fn render_with_status(
        &self,
        status: StatusCode,
        component: &str,
        props: impl Serialize,
    ) -> Response {
        match self.build(status, component, props).await {
            Ok(response) => response,
            Err(err) => {
                error!(
                    subsystem = subsystem::RENDER,
                    component_name = component,
                    error = %err,
                    "Page serialization failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }

    async fn build(
        &self,
        status: StatusCode,
        component: &str,
        props: impl Serialize,
    ) -> Result<Response> {
        let props = match serde_json::to_value(props)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(Error::Serialization(format!(
                    "page props must be an object, got {}",
                    other
                )))
            }
        };
        let page = Page {
            component: component.to_string(),
            props,
            url: self.url.clone(),
            version: self.renderer.version().to_string(),
        };
        let json = page.to_json()?;

        debug!(
            subsystem = subsystem::RENDER,
            component_name = component,
            inertia = self.is_inertia,
            "Rendering page"
        );

        let mut response = if self.is_inertia {
            let mut response = (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
                .into_response();
            response
                .headers_mut()
                .insert(X_INERTIA, HeaderValue::from_static("true"));
            response
        } else {
            let tags = self.renderer.asset_tags().await;
            let html = self.renderer.html_document(&json, &tags);
            (
                status,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                html,
            )
                .into_response()
        };
        response
            .headers_mut()
            .insert(header::VARY, HeaderValue::from_static("X-Inertia"));
        Ok(response)
    }
}

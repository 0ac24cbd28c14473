//! # taranote-api
//!
//! HTTP layer for TaraNote: router, session-based authorization gate,
//! dual-mode page rendering and the JSON admin API.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod inertia;
pub mod services;
pub mod session;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tower_sessions::SessionStore;
use uuid::Uuid;

use taranote_core::CredentialVerifier;
use taranote_db::Database;

pub use config::AppConfig;
pub use error::ApiError;

use inertia::Renderer;
use services::{AuthService, NoteService, NotebookService, PublicService, SettingService};

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub renderer: Arc<Renderer>,
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub notebooks: NotebookService,
    pub notes: NoteService,
    pub settings: SettingService,
    pub public: PublicService,
}

impl AppState {
    pub fn new(
        db: Database,
        credentials: Arc<dyn CredentialVerifier>,
        config: AppConfig,
    ) -> Self {
        let renderer = Renderer::new(config.asset_version.clone(), config.asset_mode.clone());
        Self {
            auth: AuthService::new(db.clone(), credentials),
            notebooks: NotebookService::new(db.clone()),
            notes: NoteService::new(db.clone()),
            settings: SettingService::new(db.clone()),
            public: PublicService::new(db.clone()),
            db,
            renderer: Arc::new(renderer),
            config: Arc::new(config),
        }
    }
}

/// `302 Found` redirect to `location`.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the full application router with sessions kept in `sessions`.
pub fn build_router<Store>(state: AppState, sessions: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let public = Router::new()
        .route("/", get(handlers::public::home))
        .route("/taranote", get(handlers::public::browser))
        .route("/articles/:slug", get(handlers::public::article))
        .route("/docs", get(handlers::docs::index))
        .route("/docs/*path", get(handlers::docs::page))
        .route(
            "/login",
            get(handlers::auth::show_login).post(handlers::auth::login),
        )
        .route("/logout", post(handlers::auth::logout))
        .route("/health", get(handlers::health::health_check));

    let gated = Router::new()
        .route("/dashboard", get(handlers::dashboard::show))
        .route(
            "/api/v1/admin/notebooks",
            get(handlers::notebooks::list).post(handlers::notebooks::create),
        )
        .route(
            "/api/v1/admin/notebooks/:id",
            put(handlers::notebooks::update).delete(handlers::notebooks::delete),
        )
        .route(
            "/api/v1/admin/notes",
            get(handlers::notes::list).post(handlers::notes::create),
        )
        .route(
            "/api/v1/admin/notes/:id",
            get(handlers::notes::get)
                .put(handlers::notes::update)
                .delete(handlers::notes::delete),
        )
        .route("/api/v1/admin/upload", post(handlers::upload::upload))
        .route(
            "/api/v1/admin/settings",
            get(handlers::settings::list).post(handlers::settings::update),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.config.allowed_origins.clone()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(inertia::X_INERTIA),
            HeaderName::from_static(inertia::X_INERTIA_VERSION),
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([
            HeaderName::from_static(inertia::X_INERTIA),
            HeaderName::from_static(inertia::X_INERTIA_LOCATION),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600));

    let max_upload_bytes = state.config.max_upload_bytes;
    let session_layer = session::layer(sessions, &state.config);

    Router::new()
        .merge(public)
        .merge(gated)
        .layer(session_layer)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(middleware::map_response(error::payload_too_large_as_json))
        .with_state(state)
}

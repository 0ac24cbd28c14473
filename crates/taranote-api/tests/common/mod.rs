//! Shared harness for router-level tests: the real router over the in-memory
//! store, a fast credential verifier and a scratch directory for files.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::SessionStore;

use taranote_api::config::{AppConfig, AssetMode};
use taranote_api::session::SESSION_COOKIE;
use taranote_api::{build_router, AppState};
use taranote_core::{CredentialVerifier, NewUser, Result, User, UserRepository};
use taranote_db::{Database, MemoryStore};

pub const PASSWORD: &str = "correct horse";

/// Stores passwords with a marker prefix. Keeps tests off the Argon2 cost.
pub struct PlainVerifier;

impl CredentialVerifier for PlainVerifier {
    fn hash(&self, password: &str) -> Result<String> {
        Ok(format!("plain:{}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        Ok(hash.strip_prefix("plain:") == Some(password))
    }
}

pub struct TestApp {
    pub store: MemoryStore,
    pub config: AppConfig,
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_session_store(tower_sessions::MemoryStore::default())
    }

    /// The real router with sessions kept in `sessions`.
    pub fn with_session_store<Store>(sessions: Store) -> Self
    where
        Store: SessionStore + Clone,
    {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            asset_version: "v1".to_string(),
            asset_mode: AssetMode::Dev {
                server_url: "http://localhost:5173".to_string(),
            },
            upload_dir: dir.path().join("uploads"),
            upload_url_prefix: "/public/uploads".to_string(),
            docs_dir: dir.path().join("docs"),
            ..AppConfig::default()
        };

        let store = MemoryStore::new();
        let state = AppState::new(
            Database::in_memory(store.clone()),
            Arc::new(PlainVerifier),
            config.clone(),
        );

        Self {
            store,
            config,
            router: build_router(state, sessions),
            _dir: dir,
        }
    }

    /// Insert a user whose password is [`PASSWORD`].
    pub async fn user(&self, email: &str) -> User {
        UserRepository::insert(
            &self.store,
            NewUser {
                name: format!("User {}", email),
                username: email.replace(['@', '.'], "_"),
                email: email.to_string(),
                password_hash: PlainVerifier.hash(PASSWORD).expect("hash"),
                role: "user".to_string(),
                is_admin: false,
            },
        )
        .await
        .expect("insert user")
    }

    /// `Cookie` header value for a live session of `user`, obtained by
    /// logging in.
    pub async fn cookie_for(&self, user: &User) -> String {
        let response = self
            .json(
                "POST",
                "/login",
                "",
                Some(json!({ "email": user.email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::FOUND, "login failed");
        let set_cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .expect("ascii cookie");
        session_cookie_pair(set_cookie)
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Send a JSON request as `cookie`'s session.
    pub async fn json(&self, method: &str, uri: &str, cookie: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::ACCEPT, "application/json");
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("request")).await
    }

    pub fn docs_dir(&self) -> &std::path::Path {
        &self.config.docs_dir
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

/// The `name=value` pair of a session `Set-Cookie` header.
pub fn session_cookie_pair(set_cookie: &str) -> String {
    let pair = set_cookie.split(';').next().expect("cookie pair").trim();
    assert!(
        pair.starts_with(&format!("{}=", SESSION_COOKIE)),
        "unexpected cookie {}",
        set_cookie
    );
    pair.to_string()
}

//! Router-level tests for dual-mode page rendering, public pages and docs.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use common::{body_json, body_text, TestApp};

fn inertia_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-inertia", "true")
        .header("x-inertia-version", "v1")
        .body(Body::empty())
        .unwrap()
}

fn browser_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap()
}

/// Create and publish a note through the admin API. Returns its slug.
async fn publish(app: &TestApp, cookie: &str, title: &str, content: &str) -> String {
    let response = app
        .json(
            "POST",
            "/api/v1/admin/notes",
            cookie,
            Some(json!({ "title": title })),
        )
        .await;
    let note = body_json(response).await;
    let uri = format!("/api/v1/admin/notes/{}", note["id"].as_str().unwrap());
    let response = app
        .json(
            "PUT",
            &uri,
            cookie,
            Some(json!({ "title": title, "content": content, "status": "PUBLISHED" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    note["slug"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_inertia_request_gets_json_envelope() {
    let app = TestApp::new();
    let response = app.send(inertia_get("/?page=1")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-inertia"], "true");
    assert_eq!(response.headers()[header::VARY], "X-Inertia");
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let page = body_json(response).await;
    assert_eq!(page["component"], "Articles");
    assert_eq!(page["url"], "/?page=1");
    assert_eq!(page["version"], "v1");
    assert!(page["props"]["notes"].is_array());
    assert!(page["props"]["notebooks"].is_array());
}

#[tokio::test]
async fn test_browser_request_embeds_identical_envelope_in_html() {
    let app = TestApp::new();
    let user = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&user).await;
    publish(&app, &cookie, "Tags & <Markup>", "<p>a</p>").await;

    let json = body_text(app.send(inertia_get("/taranote")).await).await;

    let response = app.send(browser_get("/taranote")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-inertia").is_none());
    assert_eq!(response.headers()[header::VARY], "X-Inertia");
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = body_text(response).await;
    assert!(html.contains(&format!(
        "<script type=\"application/json\" id=\"page-data\">{}</script>",
        json
    )));
    assert!(html.contains("<div id=\"app\" data-page-source=\"page-data\"></div>"));
    assert!(html.contains("http://localhost:5173/@vite/client"));
    assert!(!json.contains("<Markup>"));
}

#[tokio::test]
async fn test_stale_asset_version_forces_reload() {
    let app = TestApp::new();
    let response = app
        .send(
            Request::get("/taranote")
                .header("x-inertia", "true")
                .header("x-inertia-version", "old")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(response.headers()["x-inertia-location"], "/taranote");
}

#[tokio::test]
async fn test_article_page_shows_only_published_notes() {
    let app = TestApp::new();
    let user = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&user).await;
    let slug = publish(&app, &cookie, "Public Post", "<p>Hello</p>").await;
    let response = app
        .json(
            "POST",
            "/api/v1/admin/notes",
            &cookie,
            Some(json!({ "title": "Secret Draft" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.send(inertia_get(&format!("/articles/{}", slug))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["component"], "Docs");
    assert_eq!(page["props"]["article"]["title"], "Public Post");
    assert_eq!(page["props"]["article"]["views"], 1);
    assert!(page["props"]["settings"].is_object());

    let response = app.send(inertia_get("/articles/secret-draft")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let page = body_json(response).await;
    assert_eq!(page["component"], "Error");
    assert_eq!(page["props"]["status"], 404);
}

#[tokio::test]
async fn test_public_listing_includes_signed_in_user() {
    let app = TestApp::new();
    let user = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&user).await;

    let anonymous = body_json(app.send(inertia_get("/")).await).await;
    assert_eq!(anonymous["props"]["auth"]["user"], serde_json::Value::Null);

    let mut request = inertia_get("/");
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let signed_in = body_json(app.send(request).await).await;
    assert_eq!(signed_in["props"]["auth"]["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_login_page_renders() {
    let app = TestApp::new();
    let page = body_json(app.send(inertia_get("/login")).await).await;
    assert_eq!(page["component"], "Auth/Login");
}

#[tokio::test]
async fn test_docs_pages() {
    let app = TestApp::new();
    let docs = app.docs_dir();
    std::fs::create_dir_all(docs.join("guides/setup")).unwrap();
    std::fs::write(docs.join("INDEX.md"), "# Welcome").unwrap();
    std::fs::write(docs.join("guides/getting_started.md"), "# Start here").unwrap();
    std::fs::write(docs.join("guides/setup/README.md"), "# Setup").unwrap();

    let page = body_json(app.send(inertia_get("/docs")).await).await;
    assert_eq!(page["props"]["content"], "# Welcome");
    assert_eq!(page["props"]["displayName"], "Index");

    let page = body_json(app.send(inertia_get("/docs/guides/getting_started")).await).await;
    assert_eq!(page["component"], "Docs");
    assert_eq!(page["props"]["content"], "# Start here");
    assert_eq!(page["props"]["currentPath"], "guides/getting_started");
    assert_eq!(page["props"]["displayName"], "Getting Started");

    let page = body_json(app.send(inertia_get("/docs/guides/setup")).await).await;
    assert_eq!(page["props"]["content"], "# Setup");

    let response = app.send(inertia_get("/docs/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let page = body_json(response).await;
    assert_eq!(page["props"]["displayName"], "Not Found");
    assert!(page["props"]["content"]
        .as_str()
        .unwrap()
        .starts_with("# 404 Not Found"));
}

#[tokio::test]
async fn test_docs_rejects_parent_segments() {
    let app = TestApp::new();
    let response = app.send(inertia_get("/docs/guides/..%2F..%2Fsecret")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let page = body_json(response).await;
    assert_eq!(page["component"], "Error");
    assert_eq!(page["props"]["status"], 400);

    let response = app.send(browser_get("/docs/..%2Fsecret")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.send(browser_get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

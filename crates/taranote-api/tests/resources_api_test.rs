//! Router-level tests for owner-scoped notebook and note endpoints.

mod common;

use axum::http::{header, StatusCode};
use serde_json::{json, Value};

use common::{body_json, TestApp};

async fn create_note(app: &TestApp, cookie: &str, title: &str) -> Value {
    let response = app
        .json("POST", "/api/v1/admin/notes", cookie, Some(json!({ "title": title })))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn create_notebook(app: &TestApp, cookie: &str, name: &str) -> Value {
    let response = app
        .json(
            "POST",
            "/api/v1/admin/notebooks",
            cookie,
            Some(json!({ "name": name })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[tokio::test]
async fn test_note_listing_is_owner_scoped() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let bob = app.user("bob@example.com").await;
    let ada_cookie = app.cookie_for(&ada).await;
    let bob_cookie = app.cookie_for(&bob).await;

    create_note(&app, &ada_cookie, "Ada's note").await;
    create_note(&app, &bob_cookie, "Bob's note").await;

    let response = app
        .json("GET", "/api/v1/admin/notes", &ada_cookie, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let notes = body_json(response).await;
    let notes = notes.as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "Ada's note");
    assert_eq!(notes[0]["user_id"], ada.id.to_string());
}

#[tokio::test]
async fn test_cross_owner_update_is_404_and_changes_nothing() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let bob = app.user("bob@example.com").await;
    let ada_cookie = app.cookie_for(&ada).await;
    let bob_cookie = app.cookie_for(&bob).await;

    let note = create_note(&app, &ada_cookie, "Original").await;
    let uri = format!("/api/v1/admin/notes/{}", note["id"].as_str().unwrap());

    let response = app
        .json(
            "PUT",
            &uri,
            &bob_cookie,
            Some(json!({ "title": "Hijacked", "status": "DRAFT" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.json("DELETE", &uri, &bob_cookie, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.json("GET", &uri, &ada_cookie, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Original");
}

#[tokio::test]
async fn test_create_then_fetch_round_trip() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&ada).await;

    let created = create_note(&app, &cookie, "Hello, World!").await;
    assert_eq!(created["slug"], "hello-world");
    assert_eq!(created["status"], "DRAFT");
    assert_eq!(created["notebook_id"], Value::Null);

    let uri = format!("/api/v1/admin/notes/{}", created["id"].as_str().unwrap());
    let response = app.json("GET", &uri, &cookie, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);
}

#[tokio::test]
async fn test_update_files_and_publishes_note() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&ada).await;

    let notebook = create_notebook(&app, &cookie, "Journal").await;
    let note = create_note(&app, &cookie, "Entry").await;
    let uri = format!("/api/v1/admin/notes/{}", note["id"].as_str().unwrap());

    let response = app
        .json(
            "PUT",
            &uri,
            &cookie,
            Some(json!({
                "title": "Entry, revised",
                "content": "<p>Hi</p>",
                "notebook_id": notebook["id"],
                "status": "PUBLISHED",
                "is_featured": true,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "Entry, revised");
    assert_eq!(updated["slug"], "entry");
    assert_eq!(updated["notebook_id"], notebook["id"]);
    assert!(updated["published_at"].is_string());

    let response = app
        .json(
            "GET",
            "/api/v1/admin/notes?status=PUBLISHED",
            &cookie,
            None,
        )
        .await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .json("GET", "/api/v1/admin/notes?status=DRAFT", &cookie, None)
        .await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_status_is_field_error() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&ada).await;
    let note = create_note(&app, &cookie, "Entry").await;
    let uri = format!("/api/v1/admin/notes/{}", note["id"].as_str().unwrap());

    let response = app
        .json(
            "PUT",
            &uri,
            &cookie,
            Some(json!({ "title": "Entry", "status": "LIVE" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["errors"]["status"].is_string());
}

#[tokio::test]
async fn test_search_filter_matches_title_and_content() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&ada).await;
    create_note(&app, &cookie, "Rust ownership").await;
    create_note(&app, &cookie, "Gardening").await;

    let response = app
        .json("GET", "/api/v1/admin/notes?search=RUST", &cookie, None)
        .await;
    let notes = body_json(response).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["title"], "Rust ownership");
}

#[tokio::test]
async fn test_same_name_notebooks_get_numbered_slugs() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let bob = app.user("bob@example.com").await;
    let ada_cookie = app.cookie_for(&ada).await;
    let bob_cookie = app.cookie_for(&bob).await;

    let first = create_notebook(&app, &ada_cookie, "Field Notes").await;
    let second = create_notebook(&app, &ada_cookie, "Field Notes").await;
    let third = create_notebook(&app, &bob_cookie, "Field Notes").await;

    assert_eq!(first["slug"], "field-notes");
    assert_eq!(second["slug"], "field-notes-1");
    assert_eq!(third["slug"], "field-notes-2");

    let response = app
        .json("GET", "/api/v1/admin/notebooks", &bob_cookie, None)
        .await;
    let listed = body_json(response).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_notebook_update_and_delete() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&ada).await;

    let notebook = create_notebook(&app, &cookie, "Drafts").await;
    let uri = format!(
        "/api/v1/admin/notebooks/{}",
        notebook["id"].as_str().unwrap()
    );

    let response = app
        .json(
            "PUT",
            &uri,
            &cookie,
            Some(json!({ "name": "Essays", "slug": "", "description": "Long form" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["slug"], "essays");
    assert_eq!(updated["data"]["description"], "Long form");

    let response = app.json("DELETE", &uri, &cookie, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.json("DELETE", &uri, &cookie, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notebook_name_is_required() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&ada).await;

    let response = app
        .json(
            "POST",
            "/api/v1/admin/notebooks",
            &cookie,
            Some(json!({ "name": "  " })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["errors"]["name"].is_string());
}

#[tokio::test]
async fn test_malformed_id_is_json_400() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&ada).await;

    for (method, uri) in [
        ("GET", "/api/v1/admin/notes/not-a-uuid"),
        ("DELETE", "/api/v1/admin/notebooks/not-a-uuid"),
    ] {
        let response = app.json(method, uri, &cookie, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert!(body_json(response).await["error"].is_string());
    }
}

#[tokio::test]
async fn test_malformed_query_is_json_400() {
    let app = TestApp::new();
    let ada = app.user("ada@example.com").await;
    let cookie = app.cookie_for(&ada).await;

    let response = app
        .json("GET", "/api/v1/admin/notes?notebook_id=zzz", &cookie, None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert!(body_json(response).await["error"].is_string());
}

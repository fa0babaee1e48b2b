#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use game_catalog_back::{
    config::AppConfig, dao::item_store::memory::MemoryItemStore, routes, state::AppState,
    state::SharedState,
};

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "catalog-test-boundary";

/// Router backed by an in-memory store, with uploads and static files under a temporary directory.
pub struct TestApp {
    pub router: Router,
    pub state: SharedState,
    pub dir: TempDir,
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(|config| config)
}

/// Same as [`build_test_app`], with a hook to adjust the configuration.
pub fn build_test_app_with(configure: impl FnOnce(AppConfig) -> AppConfig) -> TestApp {
    let dir = tempfile::tempdir().expect("create temp dir");
    let public_dir = dir.path().join("public");
    std::fs::create_dir_all(&public_dir).expect("create public dir");
    std::fs::write(public_dir.join("index.html"), "<h1>Game Catalog</h1>").expect("write index");

    let config = configure(
        AppConfig::default()
            .with_uploads_dir(dir.path().join("uploads"))
            .with_public_dir(public_dir),
    );
    let state = AppState::with_item_store(config, Arc::new(MemoryItemStore::new()));
    let router = routes::router(state.clone());

    TestApp { router, state, dir }
}

/// Valid JSON payload for the Hades scenario.
pub fn hades_payload() -> Value {
    serde_json::json!({
        "title": "Hades",
        "genre": "Action",
        "releaseYear": 2020,
        "platform": "PC",
        "characters": ["Zagreus", "Hades"]
    })
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
}

pub async fn send_json(app: &Router, method: Method, uri: &str, payload: &Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send_multipart(app: &Router, method: Method, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Encode text fields and an optional `(file name, content type, bytes)` image part.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Location on disk of an image served under `/uploads`.
pub fn uploaded_file(app: &TestApp, image_ref: &str) -> std::path::PathBuf {
    app.dir
        .path()
        .join("uploads")
        .join(image_ref.trim_start_matches("/uploads/"))
}

/// Multipart fields for a valid Hades submission.
pub const HADES_FIELDS: &[(&str, &str)] = &[
    ("title", "Hades"),
    ("genre", "Action"),
    ("releaseYear", "2020"),
    ("platform", "PC"),
    ("characters", "Zagreus, Hades"),
];

/// Current catalog as returned by `GET /api/data`.
pub async fn list(app: &Router) -> Vec<Value> {
    let json = body_json(get(app, "/api/data").await).await;
    json.as_array().cloned().unwrap_or_default()
}

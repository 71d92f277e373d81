//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use pricecast::testing::{cars_csv, model_json, stage_app_root};
use pricecast::AppContext;

/// Application context over a staged root. The `TempDir` must outlive the test.
pub fn context_with(csv: Option<&Path>, model: Option<&Path>) -> (TempDir, Arc<AppContext>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = stage_app_root(dir.path(), csv, model).expect("stage fixtures");
    (dir, Arc::new(AppContext::load(&config)))
}

/// Cars dataset with the named model fixture.
pub fn context(model: &str) -> (TempDir, Arc<AppContext>) {
    context_with(Some(cars_csv().as_path()), Some(model_json(model).as_path()))
}

pub async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

/// POST `fields` urlencoded to `uri`.
pub async fn post(router: Router, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, String) {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(router, request).await
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn encode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use http_body_util::BodyExt;
use minedu_sessions::llm::{GeminiClient, GeminiConfig, RetryPolicy};
use minedu_sessions::{AppState, LessonGenerator, SessionStore, router};
use serde_json::{Value, json};
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Model name used against the mock server.
pub const MODEL: &str = "gemini-test";

pub const API_KEY: &str = "test-api-key";

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a recorded Gemini reply.
pub fn gemini_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("gemini").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Path of the generateContent endpoint for [`MODEL`].
pub fn generate_path() -> String {
    format!("/models/{}:generateContent", MODEL)
}

/// A successful generateContent body whose only part is `text`.
pub fn gemini_text(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

/// A Google API error response.
pub fn gemini_error(code: u16, status: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "error": {"code": code, "message": message, "status": status}
    }))
}

/// Answer every generateContent call with `text`.
pub async fn mount_text(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(header_matcher("x-goog-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text(text)))
        .mount(server)
        .await;
}

/// Answer every generateContent call with `response`.
pub async fn mount_response(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(response)
        .mount(server)
        .await;
}

/// A Gemini client pointing at the mock server.
pub fn gemini_client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_key: API_KEY.to_string(),
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
    })
    .expect("Failed to build Gemini client")
}

/// Two attempts with no wait in between, so retry tests stay fast.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(2, Duration::ZERO)
}

/// Application state wired to the mock server.
pub fn test_state(server: &MockServer, static_dir: PathBuf) -> AppState {
    AppState {
        generator: LessonGenerator::new(Arc::new(gemini_client(server)), MODEL, fast_policy()),
        store: SessionStore::new(Duration::from_secs(3600)),
        static_dir,
    }
}

/// Router wired to the mock server, serving assets from the fixtures dir.
pub fn test_app(server: &MockServer) -> Router {
    router(test_state(server, fixtures_dir().join("static")))
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

/// Collect a response body.
pub async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Body is not JSON")
}

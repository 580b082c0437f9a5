#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use speaklingo_api::{config::Config, create_router, services::AppState};

pub async fn create_test_app() -> Router {
    // Default test app: no interpretation key configured, so the gateway
    // resolves with its call-failure fallback and never touches the network.
    let config = Config { interpret_api_key: None, ..Config::for_tests() };
    create_test_app_with(config).await
}

pub async fn create_test_app_with(config: Config) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(
        AppState::new(config)
            .await
            .expect("Failed to initialize test app state"),
    );
    create_router(app_state)
}

/// Minimal stand-in for the interpretation service: answers every
/// /v1/messages call with an Anthropic-style body whose text block is
/// `inner_json`.
pub async fn spawn_mock_interpreter(inner_json: Value) -> String {
    let text = inner_json.to_string();
    let app = Router::new().route(
        "/v1/messages",
        post(move || {
            let text = text.clone();
            async move { Json(json!({ "content": [{ "type": "text", "text": text }] })) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = builder
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, value)
}

pub async fn request_with_header(
    app: &Router,
    method: &str,
    uri: &str,
    header: (&str, &str),
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header.0, header.1)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, value)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(app, "POST", uri, Some(body), None).await
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    request(app, "GET", uri, None, None).await
}

/// Unlock the parent dashboard with the default PIN and return the token.
pub async fn unlock_dashboard(app: &Router) -> String {
    let (status, body) = post_json(app, "/api/v1/auth/pin", json!({ "pin": "1234" })).await;
    assert_eq!(status, StatusCode::OK, "PIN unlock failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

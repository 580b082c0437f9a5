use axum::http::StatusCode;
use base64::{engine::general_purpose, Engine as _};
use serial_test::serial;

mod common;

#[tokio::test]
async fn health_reports_storage_status() {
    let app = common::create_test_app().await;

    let (status, body) = common::get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "speaklingo-api");
    assert_eq!(body["dependencies"]["storage"]["status"], "healthy");
}

#[tokio::test]
#[serial]
async fn metrics_require_basic_auth() {
    std::env::set_var("METRICS_AUTH", "ops:secret");
    let app = common::create_test_app().await;

    let (status, _) = common::get_json(&app, "/metrics").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let credentials = general_purpose::STANDARD.encode("ops:secret");
    let (status, body) = common::request_with_header(
        &app,
        "GET",
        "/metrics",
        ("authorization", &format!("Basic {}", credentials)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap_or_default().to_string();
    assert!(text.contains("http_requests_total") || text.contains("# "));

    std::env::remove_var("METRICS_AUTH");
}

#[tokio::test]
#[serial]
async fn metrics_reject_wrong_credentials() {
    std::env::set_var("METRICS_AUTH", "ops:secret");
    let app = common::create_test_app().await;

    let credentials = general_purpose::STANDARD.encode("ops:wrong");
    let (status, _) = common::request_with_header(
        &app,
        "GET",
        "/metrics",
        ("authorization", &format!("Basic {}", credentials)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    std::env::remove_var("METRICS_AUTH");
}

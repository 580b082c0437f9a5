use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn defaults_are_served_without_pin_hash() {
    let app = common::create_test_app().await;

    let (status, settings) = common::get_json(&app, "/api/v1/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["childName"], "Tristan");
    assert_eq!(settings["promptsPerSession"], 3);
    assert_eq!(settings["promptDifficulty"], 1);
    assert_eq!(settings["requireTyping"], true);
    assert_eq!(settings["textSize"], "normal");
    assert!(settings.get("parentPinHash").is_none());
}

#[tokio::test]
async fn updates_validate_ranges() {
    let app = common::create_test_app().await;

    let (status, _) = common::request(
        &app,
        "PUT",
        "/api/v1/settings",
        Some(json!({ "promptsPerSession": 9 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::request(
        &app,
        "PUT",
        "/api/v1/settings",
        Some(json!({ "newPin": "12ab" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = common::request(
        &app,
        "PUT",
        "/api/v1/settings",
        Some(json!({ "promptsPerSession": 5, "promptDifficulty": 2, "soundEnabled": true })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["promptsPerSession"], 5);
    assert_eq!(updated["promptDifficulty"], 2);
    assert_eq!(updated["soundEnabled"], true);
}

#[tokio::test]
async fn pin_gate_guards_the_dashboard() {
    let app = common::create_test_app().await;

    // No token
    let (status, _) = common::get_json(&app, "/api/v1/dashboard/sessions").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Garbage token
    let (status, _) = common::request(
        &app,
        "GET",
        "/api/v1/dashboard/sessions",
        None,
        Some("not-a-real-token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong PIN
    let (status, _) = common::post_json(&app, "/api/v1/auth/pin", json!({ "pin": "0000" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct PIN unlocks
    let token = common::unlock_dashboard(&app).await;
    let (status, sessions) =
        common::request(&app, "GET", "/api/v1/dashboard/sessions", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(sessions.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn changing_the_pin_invalidates_the_old_one() {
    let app = common::create_test_app().await;

    let (status, _) = common::request(
        &app,
        "PUT",
        "/api/v1/settings",
        Some(json!({ "newPin": "9876" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::post_json(&app, "/api/v1/auth/pin", json!({ "pin": "1234" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = common::post_json(&app, "/api/v1/auth/pin", json!({ "pin": "9876" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn skip_respects_allow_skipping_setting() {
    let app = common::create_test_app().await;

    let (status, _) = common::request(
        &app,
        "PUT",
        "/api/v1/settings",
        Some(json!({ "allowSkipping": false, "requireTyping": false })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, session) =
        common::post_json(&app, "/api/v1/sessions", json!({ "promptsPerSession": 1 })).await;
    let id = session["sessionId"].as_str().unwrap();

    let (status, _) =
        common::post_json(&app, &format!("/api/v1/sessions/{}/skip", id), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn export_snapshot_has_all_stores() {
    let app = common::create_test_app().await;

    // Complete one tiny session so the snapshot is non-trivial.
    let (_, session) = common::post_json(
        &app,
        "/api/v1/sessions",
        json!({ "promptsPerSession": 1, "requireTyping": false }),
    )
    .await;
    let id = session["sessionId"].as_str().unwrap();
    common::post_json(&app, &format!("/api/v1/sessions/{}/skip", id), json!({})).await;

    let token = common::unlock_dashboard(&app).await;
    let (status, snapshot) =
        common::request(&app, "GET", "/api/v1/dashboard/export", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(snapshot["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["progress"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["settings"]["childName"], "Tristan");
    assert!(snapshot["settings"].get("parentPinHash").is_none());

    let (status, week) = common::request(
        &app,
        "GET",
        "/api/v1/dashboard/progress/weekly",
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(week.as_array().unwrap().len(), 7);
    assert!(week.as_array().unwrap().iter().any(|d| !d.is_null()));
}

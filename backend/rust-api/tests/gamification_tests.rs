use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn fresh_state_defaults() {
    let app = common::create_test_app().await;

    let (status, overview) = common::get_json(&app, "/api/v1/gamification").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["state"]["totalPoints"], 0);
    assert_eq!(overview["state"]["currentLevel"], 1);
    assert_eq!(overview["state"]["streakDays"], 0);
    assert_eq!(overview["level"]["name"], "Starter Star");
    assert_eq!(overview["levelProgress"]["required"], 50);
    assert!(overview["earnedBadges"].as_array().unwrap().is_empty());

    let (_, celebrations) = common::get_json(&app, "/api/v1/gamification/celebrations").await;
    assert!(celebrations["pending"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn celebrations_queue_is_fifo_and_dismissable() {
    let app = common::create_test_app().await;

    // One all-skipped session: queues a session_complete primary followed
    // by the first_session badge celebration.
    let (_, session) = common::post_json(
        &app,
        "/api/v1/sessions",
        json!({ "promptsPerSession": 1, "requireTyping": false }),
    )
    .await;
    let id = session["sessionId"].as_str().unwrap();
    common::post_json(&app, &format!("/api/v1/sessions/{}/skip", id), json!({})).await;

    let (_, celebrations) = common::get_json(&app, "/api/v1/gamification/celebrations").await;
    let pending = celebrations["pending"].as_array().unwrap().clone();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0]["type"], "session_complete");
    assert_eq!(pending[1]["type"], "badge");
    assert_eq!(pending[1]["badge"]["id"], "first_session");

    // Dismissal pops strictly from the front.
    let (_, first) =
        common::post_json(&app, "/api/v1/gamification/celebrations/dismiss", json!({})).await;
    assert_eq!(first["dismissed"]["type"], "session_complete");
    assert_eq!(first["remaining"], 1);

    let (_, second) =
        common::post_json(&app, "/api/v1/gamification/celebrations/dismiss", json!({})).await;
    assert_eq!(second["dismissed"]["type"], "badge");
    assert_eq!(second["remaining"], 0);

    let (_, empty) =
        common::post_json(&app, "/api/v1/gamification/celebrations/dismiss", json!({})).await;
    assert!(empty["dismissed"].is_null());
}

#[tokio::test]
async fn session_complete_celebration_reports_bonus_intensity() {
    let app = common::create_test_app().await;

    // A fully answered single-prompt session earns the +10 bonus, so the
    // session_complete celebration arrives at large intensity.
    let (_, session) = common::post_json(
        &app,
        "/api/v1/sessions",
        json!({ "promptsPerSession": 1, "requireTyping": false }),
    )
    .await;
    let id = session["sessionId"].as_str().unwrap();

    common::post_json(&app, &format!("/api/v1/sessions/{}/submit", id), json!({ "typedText": "" }))
        .await;
    common::post_json(
        &app,
        &format!("/api/v1/sessions/{}/transcript", id),
        json!({ "transcript": "hello there" }),
    )
    .await;
    common::post_json(&app, &format!("/api/v1/sessions/{}/next", id), json!({})).await;

    let (_, celebrations) = common::get_json(&app, "/api/v1/gamification/celebrations").await;
    let pending = celebrations["pending"].as_array().unwrap();

    let session_complete = pending
        .iter()
        .find(|c| c["type"] == "session_complete")
        .expect("completion queues its celebration");
    assert_eq!(session_complete["intensity"], "large");
    assert_eq!(session_complete["points"], 10);
}

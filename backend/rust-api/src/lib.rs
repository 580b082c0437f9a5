use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

/// CSP middleware adds Content-Security-Policy header to all responses
async fn csp_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self' 'unsafe-inline'; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' data: https:; \
             connect-src 'self'",
        ),
    );
    response
}

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    // CORS for the parent dashboard (served separately from the child app)
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        // Child-facing surfaces
        .nest("/api/v1/sessions", sessions_routes())
        .nest("/api/v1/games", games_routes())
        .nest("/api/v1/gamification", gamification_routes())
        .nest("/api/v1/progress", progress_routes())
        .nest("/api/v1/settings", settings_routes())
        .nest("/api/v1/auth", auth_routes())
        .route("/api/v1/interpret", post(handlers::interpret::interpret))
        // Parent dashboard (PIN-token protected)
        .nest(
            "/api/v1/dashboard",
            dashboard_routes(app_state.clone()).layer(cors),
        )
        .with_state(app_state)
        .layer(middleware::from_fn(csp_middleware))
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn sessions_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/", post(handlers::sessions::start_session))
        .route("/{id}", get(handlers::sessions::get_session))
        .route("/{id}/submit", post(handlers::sessions::submit_typing))
        .route("/{id}/transcript", post(handlers::sessions::submit_transcript))
        .route("/{id}/skip", post(handlers::sessions::skip_prompt))
        .route("/{id}/next", post(handlers::sessions::next_prompt))
        .route("/{id}/exit", post(handlers::sessions::exit_session))
        .route("/{id}/capture-error", post(handlers::sessions::capture_error))
}

fn games_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/topics", get(handlers::games::topics))
        .route("/{id}/start", post(handlers::games::start_game))
        .route("/{id}", get(handlers::games::get_game))
        .route("/{id}/answer", post(handlers::games::quiz_answer))
        .route("/{id}/match", post(handlers::games::matching_match))
        .route("/{id}/flip", post(handlers::games::memory_flip))
        .route("/{id}/echo", post(handlers::games::echo_submit))
        .route("/{id}/tap", post(handlers::games::karaoke_tap))
        .route("/{id}/advance", post(handlers::games::karaoke_advance))
        .route("/{id}/word", post(handlers::games::word_submit))
        .route("/{id}/pattern", post(handlers::games::beat_submit))
}

fn gamification_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/", get(handlers::gamification::overview))
        .route("/celebrations", get(handlers::gamification::celebrations))
        .route(
            "/celebrations/dismiss",
            post(handlers::gamification::dismiss_celebration),
        )
}

fn progress_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/today", get(handlers::progress::today_stats))
        .route("/{date}", get(handlers::progress::daily_progress))
}

fn settings_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new().route(
        "/",
        get(handlers::settings::get_settings).put(handlers::settings::update_settings),
    )
}

fn auth_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new().route("/pin", post(handlers::auth::pin_unlock))
}

fn dashboard_routes(
    app_state: std::sync::Arc<services::AppState>,
) -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/sessions", get(handlers::dashboard::sessions_by_date))
        .route("/sessions/{id}", get(handlers::dashboard::session_detail))
        .route("/progress/weekly", get(handlers::dashboard::weekly_progress))
        .route("/export", get(handlers::dashboard::export))
        .route_layer(middleware::from_fn_with_state(
            app_state,
            middlewares::auth::dashboard_auth_middleware,
        ))
}

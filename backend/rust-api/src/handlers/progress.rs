use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::services::AppState;

/// Today's counters plus the date-presence-derived streak (distinct from
/// the gamification engine's transactional streak counter).
pub async fn today_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let settings = state
        .settings
        .current()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let stats = state
        .progress
        .today_stats(settings.daily_goal)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((StatusCode::OK, Json(stats)))
}

pub async fn daily_progress(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if crate::utils::time::parse_date(&date).is_none() {
        return Err((StatusCode::BAD_REQUEST, format!("Invalid date '{}'", date)));
    }

    let progress = state
        .progress
        .daily(&date)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match progress {
        Some(progress) => Ok((StatusCode::OK, Json(progress))),
        None => Err((StatusCode::NOT_FOUND, format!("No progress recorded for {}", date))),
    }
}

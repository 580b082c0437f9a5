use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::progress::{DailyProgress, ProgressRecord};
use crate::models::session::SessionRecord;
use crate::models::settings::SettingsView;
use crate::services::AppState;
use crate::utils::time;

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Everything the store holds, for parent-side backup. The settings view
/// excludes the PIN hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub sessions: Vec<SessionRecord>,
    pub settings: SettingsView,
    pub progress: Vec<ProgressRecord>,
}

pub async fn sessions_by_date(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let date = query.date.unwrap_or_else(time::today_str);
    if time::parse_date(&date).is_none() {
        return Err((StatusCode::BAD_REQUEST, format!("Invalid date '{}'", date)));
    }

    let sessions = state
        .storage
        .sessions_by_date(&date)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok((StatusCode::OK, Json(sessions)))
}

pub async fn session_detail(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = state
        .storage
        .get_session(&session_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match session {
        Some(session) => Ok((StatusCode::OK, Json(session))),
        None => Err((StatusCode::NOT_FOUND, "Session not found".to_string())),
    }
}

/// Monday-start week of daily summaries for the dashboard chart.
pub async fn weekly_progress(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let date = match &query.date {
        Some(date) => time::parse_date(date)
            .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Invalid date '{}'", date)))?,
        None => time::today(),
    };

    let week: Vec<Option<DailyProgress>> = state
        .progress
        .weekly(date)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok((StatusCode::OK, Json(week)))
}

pub async fn export(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let sessions = state
        .storage
        .all_sessions()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let progress = state
        .storage
        .all_progress()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let settings = state
        .settings
        .current()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(ExportSnapshot { sessions, settings: SettingsView::from(&settings), progress }),
    ))
}

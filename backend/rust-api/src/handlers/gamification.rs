use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::models::gamification::CelebrationEvent;
use crate::services::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CelebrationsView {
    pub pending: Vec<CelebrationEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissed: Option<CelebrationEvent>,
    pub remaining: usize,
}

pub async fn overview(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let overview = state.gamification.overview().await;
    (StatusCode::OK, Json(overview))
}

/// Pending celebrations in FIFO order; the front entry is the one the
/// client shows next.
pub async fn celebrations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pending = state.gamification.celebrations().await;
    (StatusCode::OK, Json(CelebrationsView { pending }))
}

pub async fn dismiss_celebration(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dismissed = state.gamification.dismiss_celebration().await;
    let remaining = state.gamification.celebrations().await.len();
    (StatusCode::OK, Json(DismissResponse { dismissed, remaining }))
}

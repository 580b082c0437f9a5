use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::metrics::PIN_UNLOCKS_TOTAL;
use crate::middlewares::auth::DASHBOARD_TOKEN_TTL_SECONDS;
use crate::models::settings::{PinUnlockRequest, PinUnlockResponse};
use crate::services::AppState;

/// Parent dashboard unlock: bcrypt-verified PIN exchange for a short-lived
/// bearer token.
pub async fn pin_unlock(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PinUnlockRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let valid = state
        .settings
        .verify_pin(&req.pin)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    if !valid {
        PIN_UNLOCKS_TOTAL.with_label_values(&["denied"]).inc();
        tracing::warn!("Dashboard unlock denied: wrong PIN");
        return Err((StatusCode::UNAUTHORIZED, "Incorrect PIN".to_string()));
    }

    let token = state
        .jwt
        .issue_dashboard_token()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    PIN_UNLOCKS_TOTAL.with_label_values(&["ok"]).inc();
    Ok((
        StatusCode::OK,
        Json(PinUnlockResponse { token, expires_in_seconds: DASHBOARD_TOKEN_TTL_SECONDS }),
    ))
}

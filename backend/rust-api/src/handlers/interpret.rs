use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::models::interpret::InterpretRequest;
use crate::services::interpret_service::InterpretError;
use crate::services::AppState;

/// The interpretation gateway endpoint. Validation failures are the only
/// errors it surfaces; service trouble is absorbed into fallback bodies
/// with HTTP 200.
pub async fn interpret(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InterpretRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let settings = state
        .settings
        .current()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match state.interpreter.interpret(&req, &settings.child_name).await {
        Ok(interpretation) => Ok((StatusCode::OK, Json(interpretation))),
        Err(InterpretError::MissingResponse) => {
            Err((StatusCode::BAD_REQUEST, "No response provided".to_string()))
        }
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::metrics::CAPTURE_ERRORS_TOTAL;
use crate::models::interpret::InterpretRequest;
use crate::models::session::{
    AdvanceResponse, CaptureErrorRequest, ExitResponse, SessionError, SessionRecord,
    StartSessionRequest, SubmitTypingRequest, TranscriptRequest, TranscriptResponse,
};
use crate::services::gamification_service::SessionCompletionOutcome;
use crate::services::interpret_service::{call_failure_fallback, InterpretError};
use crate::services::session_service::SessionConfig;
use crate::services::{content_service, AppState};
use crate::utils::retry::{retry_with_backoff, RetryConfig};

fn session_error_response(e: SessionError) -> (StatusCode, String) {
    let status = match e {
        SessionError::NotFound => StatusCode::NOT_FOUND,
        SessionError::InvalidPhase { .. } => StatusCode::CONFLICT,
        SessionError::TypingRequired => StatusCode::CONFLICT,
        SessionError::SkippingDisabled => StatusCode::CONFLICT,
    };
    (status, e.to_string())
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let settings = state
        .settings
        .current()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let count = req
        .prompts_per_session
        .unwrap_or(settings.prompts_per_session)
        .clamp(1, 5) as usize;
    let difficulty = req.prompt_difficulty.unwrap_or(settings.prompt_difficulty).clamp(1, 3);
    let require_typing = req.require_typing.unwrap_or(settings.require_typing);

    let prompts = content_service::session_prompts(difficulty, count, &[]);
    let config = SessionConfig { require_typing, allow_skipping: settings.allow_skipping };

    let view = state.sessions.start(prompts, config).await;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = state.sessions.view(&session_id).await.map_err(session_error_response)?;
    Ok((StatusCode::OK, Json(view)))
}

/// prompt -> speaking (the typing gate).
pub async fn submit_typing(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitTypingRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = state
        .sessions
        .submit_typing(&session_id, &req.typed_text)
        .await
        .map_err(session_error_response)?;
    Ok((StatusCode::OK, Json(view)))
}

/// speaking -> processing -> feedback. Drives the interpretation gateway;
/// the session proceeds on fallback feedback whenever the gateway cannot
/// deliver a real interpretation.
pub async fn submit_transcript(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<TranscriptRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let ticket = state
        .sessions
        .begin_processing(&session_id, &req.transcript)
        .await
        .map_err(session_error_response)?;

    let settings = state
        .settings
        .current()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let interpret_req = InterpretRequest {
        prompt_text: ticket.prompt_text.clone(),
        typed_response: ticket.typed_response.clone(),
        spoken_transcript: ticket.transcript.clone(),
    };

    // The gateway only fails fast on empty input; everything else resolves
    // to a real interpretation or a deterministic fallback.
    let interpretation = match state.interpreter.interpret(&interpret_req, &settings.child_name).await
    {
        Ok(interpretation) => interpretation,
        Err(InterpretError::MissingResponse) => call_failure_fallback(),
    };

    let (attempt, view) = state
        .sessions
        .record_interpretation(&ticket, interpretation)
        .await
        .map_err(session_error_response)?;

    let points_awarded = match &attempt {
        Some(attempt) => state.gamification.score_attempt(attempt, Some(&session_id)).await,
        None => 0,
    };

    Ok((
        StatusCode::OK,
        Json(TranscriptResponse { session: view, attempt, points_awarded }),
    ))
}

pub async fn skip_prompt(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = state.sessions.skip(&session_id).await.map_err(session_error_response)?;

    // Skipped attempts are still fed to the engine; they score 0 there.
    state.gamification.score_attempt(&result.attempt, Some(&session_id)).await;

    let response = match result.finished_record {
        Some(record) => {
            let outcome = finalize_completed_session(&state, &record).await;
            AdvanceResponse {
                session: result.view,
                session_completed: true,
                record_id: Some(record.id.clone()),
                bonus_points: Some(outcome.bonus_points),
                completed_count: Some(record.completed_count()),
            }
        }
        None => AdvanceResponse {
            session: result.view,
            session_completed: false,
            record_id: None,
            bonus_points: None,
            completed_count: None,
        },
    };
    Ok((StatusCode::OK, Json(response)))
}

/// feedback -> next prompt, or completes the session on the last one.
pub async fn next_prompt(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = state.sessions.advance(&session_id).await.map_err(session_error_response)?;

    let response = match result.finished_record {
        Some(record) => {
            let outcome = finalize_completed_session(&state, &record).await;
            AdvanceResponse {
                session: result.view,
                session_completed: true,
                record_id: Some(record.id.clone()),
                bonus_points: Some(outcome.bonus_points),
                completed_count: Some(record.completed_count()),
            }
        }
        None => AdvanceResponse {
            session: result.view,
            session_completed: false,
            record_id: None,
            bonus_points: None,
            completed_count: None,
        },
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Exit-early: persists whatever was recorded as an incomplete session.
/// No session-level bonus or streak update applies.
pub async fn exit_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = state.sessions.exit_early(&session_id).await.map_err(session_error_response)?;

    let record_id = if result.record.attempts.is_empty() {
        None
    } else {
        persist_session_record(&state, &result.record).await;
        if let Err(e) = state.progress.fold_session(&result.record).await {
            tracing::error!("Failed to fold exited session into progress: {:#}", e);
        }
        Some(result.record.id.clone())
    };

    Ok((StatusCode::OK, Json(ExitResponse { session: result.view, record_id })))
}

/// Speech-capture failures are transient: logged and counted, no state
/// change, no attempt. The client retries from the same phase.
pub async fn capture_error(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<CaptureErrorRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    CAPTURE_ERRORS_TOTAL.with_label_values(&[req.reason.as_str()]).inc();
    tracing::warn!("Speech capture failed for session {}: {:?}", session_id, req.reason);

    let view = state.sessions.view(&session_id).await.map_err(session_error_response)?;
    Ok((StatusCode::OK, Json(view)))
}

/// Persist + fold + gamify one normally completed session. Persistence is
/// optimistic: failures are logged, the child-facing flow never blocks.
async fn finalize_completed_session(
    state: &AppState,
    record: &SessionRecord,
) -> SessionCompletionOutcome {
    persist_session_record(state, record).await;

    if let Err(e) = state.progress.fold_session(record).await {
        tracing::error!("Failed to fold session {} into daily progress: {:#}", record.id, e);
    }

    state.gamification.complete_session(&record.attempts, &record.id).await
}

async fn persist_session_record(state: &AppState, record: &SessionRecord) {
    let result = retry_with_backoff(RetryConfig::persistent(), || async {
        state.storage.save_session(record).await
    })
    .await;

    if let Err(e) = result {
        tracing::error!("Failed to save session record {}: {:#}", record.id, e);
    }
}

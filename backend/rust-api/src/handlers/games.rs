use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::content::{topic_info, GameTopic, TopicInfo};
use crate::models::games::{GameError, GameKind, GameSummary};
use crate::services::game_service::GameView;
use crate::services::gamification_service::GameCompletionOutcome;
use crate::services::AppState;

fn game_error_response(e: GameError) -> (StatusCode, String) {
    let status = match e {
        GameError::NotFound => StatusCode::NOT_FOUND,
        GameError::AlreadyComplete => StatusCode::CONFLICT,
        GameError::InvalidAction(_) => StatusCode::BAD_REQUEST,
    };
    (status, e.to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    pub topic: Option<GameTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswerRequest {
    pub choice_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub word_id: String,
    pub emoji_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipRequest {
    pub card_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoSubmitRequest {
    #[serde(default)]
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TapRequest {
    pub word_id: String,
    pub beat_index: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSubmitRequest {
    pub word: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSubmitRequest {
    pub pattern: Vec<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameActionResponse {
    pub outcome: Value,
    pub game: GameView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<GameSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamification: Option<GameCompletionOutcome>,
}

pub async fn topics() -> impl IntoResponse {
    let topics: Vec<TopicInfo> = GameTopic::ALL.iter().map(|t| topic_info(*t)).collect();
    (StatusCode::OK, Json(topics))
}

pub async fn start_game(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(req): Json<StartGameRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = GameKind::from_str(&kind)
        .map_err(|_| (StatusCode::NOT_FOUND, format!("Unknown game '{}'", kind)))?;

    let view = state.games.start(kind, req.topic).await.map_err(game_error_response)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = state.games.view(&game_id).await.map_err(game_error_response)?;
    Ok((StatusCode::OK, Json(view)))
}

pub async fn quiz_answer(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<QuizAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let action = state.games.quiz_answer(&game_id, &req.choice_id).await;
    respond(&state, action).await
}

pub async fn matching_match(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<MatchRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let action = state.games.matching_match(&game_id, &req.word_id, &req.emoji_id).await;
    respond(&state, action).await
}

pub async fn memory_flip(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<FlipRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let action = state.games.memory_flip(&game_id, &req.card_id).await;
    respond(&state, action).await
}

pub async fn echo_submit(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<EchoSubmitRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let action = state.games.echo_submit(&game_id, &req.transcript).await;
    respond(&state, action).await
}

pub async fn karaoke_tap(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<TapRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let action = state.games.karaoke_tap(&game_id, &req.word_id, req.beat_index).await;
    respond(&state, action).await
}

pub async fn karaoke_advance(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let action = state.games.karaoke_advance(&game_id).await;
    respond(&state, action).await
}

pub async fn word_submit(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<WordSubmitRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let action = state.games.word_submit(&game_id, &req.word).await;
    respond(&state, action).await
}

pub async fn beat_submit(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<PatternSubmitRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let action = state.games.beat_submit(&game_id, &req.pattern).await;
    respond(&state, action).await
}

/// Shared tail of every game action: on the action that completed the
/// game, report the summary to the gamification engine.
async fn respond(
    state: &AppState,
    action: Result<(Value, GameView, Option<GameSummary>), GameError>,
) -> Result<(StatusCode, Json<GameActionResponse>), (StatusCode, String)> {
    let (outcome, game, summary) = action.map_err(game_error_response)?;

    let gamification = match &summary {
        Some(summary) => Some(
            state
                .gamification
                .complete_game(summary.kind, summary.is_perfect, summary.final_score)
                .await,
        ),
        None => None,
    };

    Ok((
        StatusCode::OK,
        Json(GameActionResponse { outcome, game, summary, gamification }),
    ))
}

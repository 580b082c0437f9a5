use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::content::Prompt;
use crate::models::interpret::{Clarity, Engagement, Interpretation};

/// Phases of the guided conversation loop. `complete` is terminal and is
/// also reachable from every other phase via exit-early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Prompt,
    Speaking,
    Processing,
    Feedback,
    Complete,
}

/// One recorded child response (or skip) to one prompt. Immutable once
/// recorded; owned by the session until appended to a `SessionRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttempt {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub prompt_id: String,
    pub prompt_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed_response: Option<String>,
    pub spoken_transcript: String,
    pub skipped: bool,
    pub interpretation: String,
    pub feedback_for_child: String,
    pub insight_for_parent: String,
    pub engagement: Engagement,
    pub clarity: Clarity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_follow_up: Option<String>,
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    /// YYYY-MM-DD, the secondary index key for dashboard lookups.
    pub date: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attempts: Vec<SessionAttempt>,
    pub completed: bool,
}

impl SessionRecord {
    pub fn completed_count(&self) -> u32 {
        self.attempts.iter().filter(|a| !a.skipped).count() as u32
    }
}

/// Speech-capture failure reasons reported by the client. These are
/// transient and retryable: they never advance the session and never
/// produce an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFailure {
    Unsupported,
    PermissionDenied,
    NoSpeech,
    Network,
    Aborted,
}

impl CaptureFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureFailure::Unsupported => "unsupported",
            CaptureFailure::PermissionDenied => "permission_denied",
            CaptureFailure::NoSpeech => "no_speech",
            CaptureFailure::Network => "network",
            CaptureFailure::Aborted => "aborted",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,
    #[error("Action '{action}' is not allowed in phase '{phase:?}'")]
    InvalidPhase {
        action: &'static str,
        phase: SessionPhase,
    },
    #[error("Typed answer is required before speaking")]
    TypingRequired,
    #[error("Skipping is disabled for this session")]
    SkippingDisabled,
}

// ============ Wire DTOs ============

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub prompts_per_session: Option<u8>,
    pub prompt_difficulty: Option<u8>,
    pub require_typing: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTypingRequest {
    #[serde(default)]
    pub typed_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    #[serde(default)]
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureErrorRequest {
    pub reason: CaptureFailure,
}

/// Snapshot of an active session as returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub phase: SessionPhase,
    pub current_prompt_index: usize,
    pub total_prompts: usize,
    pub is_last_prompt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_prompt: Option<Prompt>,
    pub attempts_recorded: usize,
    pub completed_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Interpretation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    pub session: SessionView,
    /// Absent when the interpretation resolved after the child had already
    /// moved on (skip or exit raced the gateway call) - the stale result is
    /// discarded and nothing was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<SessionAttempt>,
    pub points_awarded: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceResponse {
    pub session: SessionView,
    pub session_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_count: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitResponse {
    pub session: SessionView,
    /// Set when at least one attempt had been recorded and the partial
    /// session was persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

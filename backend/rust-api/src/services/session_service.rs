use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::metrics::{ATTEMPTS_TOTAL, SESSIONS_ACTIVE, SESSIONS_TOTAL};
use crate::models::content::Prompt;
use crate::models::interpret::{Clarity, Engagement, Interpretation};
use crate::models::session::{SessionAttempt, SessionError, SessionPhase, SessionRecord, SessionView};
use crate::utils::time;

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub require_typing: bool,
    pub allow_skipping: bool,
}

/// Handed out when a session enters `processing`. The gateway call happens
/// outside the session lock; the epoch lets a late result be recognized as
/// stale when the child skipped or exited in the meantime.
#[derive(Debug, Clone)]
pub struct ProcessingTicket {
    pub session_id: String,
    pub epoch: u64,
    pub prompt_id: String,
    pub prompt_text: String,
    pub typed_response: Option<String>,
    pub transcript: String,
}

/// The in-memory state machine for one practice session. Transitions run
/// to completion under the service lock; there are no overlapping
/// transitions.
#[derive(Debug)]
pub struct ActiveSession {
    pub id: String,
    prompts: Vec<Prompt>,
    config: SessionConfig,
    phase: SessionPhase,
    index: usize,
    typed_text: String,
    transcript: String,
    feedback: Option<Interpretation>,
    attempts: Vec<SessionAttempt>,
    start_time: DateTime<Utc>,
    prompt_started_at: DateTime<Utc>,
    /// Bumped on every transition; a gateway result carrying an old epoch
    /// is discarded as stale.
    epoch: u64,
}

impl ActiveSession {
    pub fn new(prompts: Vec<Prompt>, config: SessionConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            prompts,
            config,
            phase: SessionPhase::Prompt,
            index: 0,
            typed_text: String::new(),
            transcript: String::new(),
            feedback: None,
            attempts: Vec::new(),
            start_time: now,
            prompt_started_at: now,
            epoch: 0,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            phase: self.phase,
            current_prompt_index: self.index,
            total_prompts: self.prompts.len(),
            is_last_prompt: self.index + 1 >= self.prompts.len(),
            current_prompt: if self.phase == SessionPhase::Complete {
                None
            } else {
                self.prompts.get(self.index).cloned()
            },
            attempts_recorded: self.attempts.len(),
            completed_count: self.attempts.iter().filter(|a| !a.skipped).count() as u32,
            feedback: self.feedback.clone(),
        }
    }

    /// prompt -> speaking, gated by the typing requirement.
    pub fn submit_typing(&mut self, typed_text: &str) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Prompt {
            return Err(SessionError::InvalidPhase { action: "submit", phase: self.phase });
        }
        if self.config.require_typing && typed_text.trim().is_empty() {
            return Err(SessionError::TypingRequired);
        }
        self.typed_text = typed_text.to_string();
        self.phase = SessionPhase::Speaking;
        self.epoch += 1;
        Ok(())
    }

    /// speaking -> processing. The transcript may be empty ("went straight
    /// to speaking" without saying anything recognizable).
    pub fn begin_processing(&mut self, transcript: &str) -> Result<ProcessingTicket, SessionError> {
        if self.phase != SessionPhase::Speaking {
            return Err(SessionError::InvalidPhase { action: "transcript", phase: self.phase });
        }
        self.transcript = transcript.to_string();
        self.phase = SessionPhase::Processing;
        self.epoch += 1;

        let prompt = &self.prompts[self.index];
        Ok(ProcessingTicket {
            session_id: self.id.clone(),
            epoch: self.epoch,
            prompt_id: prompt.id.to_string(),
            prompt_text: prompt.question_text.to_string(),
            typed_response: if self.typed_text.trim().is_empty() {
                None
            } else {
                Some(self.typed_text.clone())
            },
            transcript: transcript.to_string(),
        })
    }

    /// processing -> feedback, recording exactly one attempt. Returns
    /// `None` when the result is stale (the session moved on while the
    /// gateway call was in flight); a stale result is a no-op.
    pub fn apply_interpretation(
        &mut self,
        ticket: &ProcessingTicket,
        interpretation: Interpretation,
    ) -> Option<SessionAttempt> {
        if self.phase != SessionPhase::Processing || self.epoch != ticket.epoch {
            return None;
        }

        let attempt = SessionAttempt {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            prompt_id: ticket.prompt_id.clone(),
            prompt_text: ticket.prompt_text.clone(),
            typed_response: ticket.typed_response.clone(),
            spoken_transcript: ticket.transcript.clone(),
            skipped: false,
            interpretation: interpretation.interpretation.clone(),
            feedback_for_child: interpretation.feedback_for_child.clone(),
            insight_for_parent: interpretation.insight_for_parent.clone(),
            engagement: interpretation.engagement,
            clarity: interpretation.clarity,
            suggested_follow_up: Some(interpretation.suggested_follow_up.clone()),
            duration_seconds: self.elapsed_prompt_seconds(),
        };

        self.attempts.push(attempt.clone());
        self.feedback = Some(interpretation);
        self.phase = SessionPhase::Feedback;
        self.epoch += 1;
        Some(attempt)
    }

    /// Record a skipped attempt and advance. Allowed from `prompt`,
    /// `speaking` and `processing` (skipping during `processing` cancels
    /// the wait; the in-flight gateway result becomes stale). Returns true
    /// when the skip finished the session.
    pub fn skip(&mut self) -> Result<(SessionAttempt, bool), SessionError> {
        if !matches!(
            self.phase,
            SessionPhase::Prompt | SessionPhase::Speaking | SessionPhase::Processing
        ) {
            return Err(SessionError::InvalidPhase { action: "skip", phase: self.phase });
        }
        if !self.config.allow_skipping {
            return Err(SessionError::SkippingDisabled);
        }

        let prompt = &self.prompts[self.index];
        let attempt = SessionAttempt {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            prompt_id: prompt.id.to_string(),
            prompt_text: prompt.question_text.to_string(),
            typed_response: if self.typed_text.trim().is_empty() {
                None
            } else {
                Some(self.typed_text.clone())
            },
            spoken_transcript: String::new(),
            skipped: true,
            interpretation: String::new(),
            feedback_for_child: String::new(),
            insight_for_parent: "Prompt was skipped".to_string(),
            engagement: Engagement::Disengaged,
            clarity: Clarity::Unclear,
            suggested_follow_up: None,
            duration_seconds: self.elapsed_prompt_seconds(),
        };
        self.attempts.push(attempt.clone());

        let finished = self.advance_to_next();
        Ok((attempt, finished))
    }

    /// feedback -> next prompt, or -> complete on the last prompt.
    pub fn advance(&mut self) -> Result<bool, SessionError> {
        if self.phase != SessionPhase::Feedback {
            return Err(SessionError::InvalidPhase { action: "next", phase: self.phase });
        }
        Ok(self.advance_to_next())
    }

    /// Force `complete` from any non-terminal state.
    pub fn exit_early(&mut self) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Complete {
            return Err(SessionError::InvalidPhase { action: "exit", phase: self.phase });
        }
        self.phase = SessionPhase::Complete;
        self.epoch += 1;
        Ok(())
    }

    pub fn to_record(&self, completed: bool) -> SessionRecord {
        SessionRecord {
            id: self.id.clone(),
            date: time::today_str(),
            start_time: self.start_time,
            end_time: Utc::now(),
            attempts: self.attempts.clone(),
            completed,
        }
    }

    pub fn attempts(&self) -> &[SessionAttempt] {
        &self.attempts
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn advance_to_next(&mut self) -> bool {
        self.epoch += 1;
        if self.index + 1 >= self.prompts.len() {
            self.phase = SessionPhase::Complete;
            true
        } else {
            self.index += 1;
            self.typed_text.clear();
            self.transcript.clear();
            self.feedback = None;
            self.prompt_started_at = Utc::now();
            self.phase = SessionPhase::Prompt;
            false
        }
    }

    /// Wall-clock seconds since the prompt phase started, rounded to the
    /// nearest second, never negative.
    fn elapsed_prompt_seconds(&self) -> i64 {
        let millis = (Utc::now() - self.prompt_started_at).num_milliseconds();
        ((millis as f64) / 1000.0).round().max(0.0) as i64
    }
}

// ============ Service ============

pub struct SkipResult {
    pub attempt: SessionAttempt,
    pub view: SessionView,
    /// Present when the skip finished the session.
    pub finished_record: Option<SessionRecord>,
}

pub struct AdvanceResult {
    pub view: SessionView,
    pub finished_record: Option<SessionRecord>,
}

pub struct ExitResult {
    pub view: SessionView,
    pub record: SessionRecord,
}

/// Holds every active (and recently completed) session keyed by id and
/// serializes all transitions behind one lock. The interpretation call is
/// the only suspension point and runs between `begin_processing` and
/// `record_interpretation`, outside the lock.
pub struct SessionService {
    sessions: Mutex<HashMap<String, ActiveSession>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(HashMap::new()) }
    }

    pub async fn start(&self, prompts: Vec<Prompt>, config: SessionConfig) -> SessionView {
        let session = ActiveSession::new(prompts, config);
        let view = session.view();

        SESSIONS_TOTAL.with_label_values(&["started"]).inc();
        SESSIONS_ACTIVE.inc();
        tracing::info!(
            "Session {} started with {} prompts",
            session.id,
            view.total_prompts
        );

        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id.clone(), session);
        view
    }

    pub async fn view(&self, id: &str) -> Result<SessionView, SessionError> {
        let sessions = self.sessions.lock().await;
        sessions.get(id).map(|s| s.view()).ok_or(SessionError::NotFound)
    }

    pub async fn submit_typing(&self, id: &str, typed: &str) -> Result<SessionView, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound)?;
        session.submit_typing(typed)?;
        Ok(session.view())
    }

    pub async fn begin_processing(
        &self,
        id: &str,
        transcript: &str,
    ) -> Result<ProcessingTicket, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound)?;
        session.begin_processing(transcript)
    }

    /// Resolve the gateway call for `ticket`. A result arriving for a
    /// stale phase or epoch records nothing.
    pub async fn record_interpretation(
        &self,
        ticket: &ProcessingTicket,
        interpretation: Interpretation,
    ) -> Result<(Option<SessionAttempt>, SessionView), SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&ticket.session_id).ok_or(SessionError::NotFound)?;

        let attempt = session.apply_interpretation(ticket, interpretation);
        match &attempt {
            Some(_) => ATTEMPTS_TOTAL.with_label_values(&["answered"]).inc(),
            None => tracing::warn!(
                "Discarding stale interpretation result for session {}",
                ticket.session_id
            ),
        }
        Ok((attempt, session.view()))
    }

    pub async fn skip(&self, id: &str) -> Result<SkipResult, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound)?;

        let (attempt, finished) = session.skip()?;
        ATTEMPTS_TOTAL.with_label_values(&["skipped"]).inc();

        let finished_record = if finished {
            SESSIONS_TOTAL.with_label_values(&["completed"]).inc();
            SESSIONS_ACTIVE.dec();
            Some(session.to_record(true))
        } else {
            None
        };
        Ok(SkipResult { attempt, view: session.view(), finished_record })
    }

    pub async fn advance(&self, id: &str) -> Result<AdvanceResult, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound)?;

        let finished = session.advance()?;
        let finished_record = if finished {
            SESSIONS_TOTAL.with_label_values(&["completed"]).inc();
            SESSIONS_ACTIVE.dec();
            Some(session.to_record(true))
        } else {
            None
        };
        Ok(AdvanceResult { view: session.view(), finished_record })
    }

    pub async fn exit_early(&self, id: &str) -> Result<ExitResult, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound)?;

        session.exit_early()?;
        SESSIONS_TOTAL.with_label_values(&["exited"]).inc();
        SESSIONS_ACTIVE.dec();
        Ok(ExitResult { view: session.view(), record: session.to_record(false) })
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content_service;
    use crate::services::interpret_service::call_failure_fallback;

    fn config(require_typing: bool) -> SessionConfig {
        SessionConfig { require_typing, allow_skipping: true }
    }

    fn prompts(n: usize) -> Vec<Prompt> {
        content_service::session_prompts(3, n, &[])
    }

    fn clear_interpretation() -> Interpretation {
        Interpretation {
            interpretation: "He likes blue".into(),
            engagement: Engagement::Engaged,
            feedback_for_child: "Great job! You told me your favorite color.".into(),
            insight_for_parent: "Direct answer.".into(),
            suggested_follow_up: "What else is blue?".into(),
            clarity: Clarity::Clear,
        }
    }

    #[test]
    fn full_session_walkthrough() {
        let mut session = ActiveSession::new(prompts(3), config(true));
        assert_eq!(session.phase(), SessionPhase::Prompt);

        for round in 0..3 {
            session.submit_typing("blue").unwrap();
            assert_eq!(session.phase(), SessionPhase::Speaking);

            let ticket = session.begin_processing("blue").unwrap();
            assert_eq!(session.phase(), SessionPhase::Processing);

            let attempt = session.apply_interpretation(&ticket, clear_interpretation()).unwrap();
            assert!(!attempt.skipped);
            assert_eq!(attempt.spoken_transcript, "blue");
            assert_eq!(session.phase(), SessionPhase::Feedback);

            let finished = session.advance().unwrap();
            assert_eq!(finished, round == 2);
        }

        assert_eq!(session.phase(), SessionPhase::Complete);
        let record = session.to_record(true);
        assert!(record.completed);
        assert_eq!(record.attempts.len(), 3);
        assert_eq!(record.completed_count(), 3);
    }

    #[test]
    fn typing_gate_refuses_empty_text() {
        let mut session = ActiveSession::new(prompts(1), config(true));

        assert!(matches!(session.submit_typing("   "), Err(SessionError::TypingRequired)));
        assert_eq!(session.phase(), SessionPhase::Prompt);

        // Without the requirement, empty typed text is fine.
        let mut relaxed = ActiveSession::new(prompts(1), config(false));
        relaxed.submit_typing("").unwrap();
        assert_eq!(relaxed.phase(), SessionPhase::Speaking);
    }

    #[test]
    fn skip_records_sentinel_attempt() {
        let mut session = ActiveSession::new(prompts(2), config(false));

        let (attempt, finished) = session.skip().unwrap();
        assert!(attempt.skipped);
        assert!(!finished);
        assert_eq!(attempt.spoken_transcript, "");
        assert_eq!(attempt.engagement, Engagement::Disengaged);
        assert_eq!(attempt.clarity, Clarity::Unclear);
        assert_eq!(attempt.insight_for_parent, "Prompt was skipped");
        assert_eq!(session.phase(), SessionPhase::Prompt);

        let (_, finished) = session.skip().unwrap();
        assert!(finished);
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(session.to_record(true).completed_count(), 0);
    }

    #[test]
    fn skip_is_refused_when_disabled() {
        let mut session = ActiveSession::new(
            prompts(1),
            SessionConfig { require_typing: false, allow_skipping: false },
        );
        assert!(matches!(session.skip(), Err(SessionError::SkippingDisabled)));
    }

    #[test]
    fn skip_is_refused_from_feedback() {
        let mut session = ActiveSession::new(prompts(2), config(false));
        session.submit_typing("").unwrap();
        let ticket = session.begin_processing("hello").unwrap();
        session.apply_interpretation(&ticket, clear_interpretation()).unwrap();

        assert!(matches!(
            session.skip(),
            Err(SessionError::InvalidPhase { action: "skip", .. })
        ));
    }

    #[test]
    fn stale_interpretation_is_discarded() {
        let mut session = ActiveSession::new(prompts(2), config(false));
        session.submit_typing("").unwrap();
        let ticket = session.begin_processing("hello").unwrap();

        // The child exits while the gateway call is in flight.
        session.exit_early().unwrap();

        let result = session.apply_interpretation(&ticket, call_failure_fallback());
        assert!(result.is_none());
        assert!(session.attempts().is_empty());
        assert_eq!(session.phase(), SessionPhase::Complete);
    }

    #[test]
    fn fallback_interpretation_still_records_attempt() {
        let mut session = ActiveSession::new(prompts(1), config(false));
        session.submit_typing("").unwrap();
        let ticket = session.begin_processing("mumble").unwrap();

        let attempt = session.apply_interpretation(&ticket, call_failure_fallback()).unwrap();
        assert!(!attempt.skipped);
        assert_eq!(attempt.feedback_for_child, "Great job speaking!");
        assert_eq!(attempt.clarity, Clarity::Partial);
        assert_eq!(session.phase(), SessionPhase::Feedback);
    }

    #[test]
    fn exit_early_marks_incomplete_record() {
        let mut session = ActiveSession::new(prompts(3), config(false));
        session.submit_typing("").unwrap();
        let ticket = session.begin_processing("hi").unwrap();
        session.apply_interpretation(&ticket, clear_interpretation()).unwrap();
        session.advance().unwrap();

        session.exit_early().unwrap();
        let record = session.to_record(false);
        assert!(!record.completed);
        assert_eq!(record.attempts.len(), 1);

        // exit is not valid twice
        assert!(session.exit_early().is_err());
    }

    #[test]
    fn transcript_requires_speaking_phase() {
        let mut session = ActiveSession::new(prompts(1), config(false));
        assert!(matches!(
            session.begin_processing("hello"),
            Err(SessionError::InvalidPhase { action: "transcript", .. })
        ));
    }

    #[test]
    fn durations_are_never_negative() {
        let session = ActiveSession::new(prompts(1), config(false));
        assert!(session.elapsed_prompt_seconds() >= 0);
    }

    #[tokio::test]
    async fn service_discards_stale_results_after_skip() {
        let service = SessionService::new();
        let view = service.start(prompts(2), config(false)).await;
        let id = view.session_id.clone();

        service.submit_typing(&id, "").await.unwrap();
        let ticket = service.begin_processing(&id, "hello").await.unwrap();

        // Skip arrives while the gateway call is in flight; processing is
        // no longer the current phase when the result lands.
        service.skip(&id).await.unwrap();

        let (attempt, view) = service
            .record_interpretation(&ticket, call_failure_fallback())
            .await
            .unwrap();
        assert!(attempt.is_none());
        assert_eq!(view.attempts_recorded, 1); // just the skip
        assert_eq!(view.completed_count, 0);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let service = SessionService::new();
        assert!(matches!(service.view("nope").await, Err(SessionError::NotFound)));
    }
}

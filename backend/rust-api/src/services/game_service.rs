use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::content::GameTopic;
use crate::models::games::{
    BeatMakerEngine, EchoEngine, GameEngine, GameError, GameKind, GameSummary, KaraokeEngine,
    MatchingEngine, MemoryEngine, QuizEngine, WordBuilderEngine, BEAT_MAKER_ROUNDS, ECHO_ROUNDS,
    KARAOKE_ROUNDS, MATCHING_ITEMS, MATCHING_ROUNDS, MEMORY_PAIRS, QUIZ_ROUNDS,
    WORD_BUILDER_ROUNDS,
};
use crate::services::content_service;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub game_id: String,
    pub kind: GameKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<GameTopic>,
    pub round: usize,
    pub total_rounds: usize,
    pub score: i64,
    pub complete: bool,
    pub board: Value,
}

struct GameRun {
    id: String,
    topic: Option<GameTopic>,
    engine: GameEngine,
}

impl GameRun {
    fn view(&self) -> GameView {
        GameView {
            game_id: self.id.clone(),
            kind: self.engine.kind(),
            topic: self.topic,
            round: self.engine.round(),
            total_rounds: self.engine.total_rounds(),
            score: self.engine.score(),
            complete: self.engine.is_complete(),
            board: self.engine.board(),
        }
    }

    fn summary_if_complete(&self) -> Option<GameSummary> {
        if self.engine.is_complete() {
            Some(GameSummary {
                kind: self.engine.kind(),
                topic: self.topic,
                final_score: self.engine.score(),
                is_perfect: self.engine.is_perfect(),
                rounds: self.engine.total_rounds() as u32,
            })
        } else {
            None
        }
    }
}

/// Round-engine host: generates content for a new game, keeps each run
/// keyed by id and serializes actions behind one lock. Completion summaries
/// are handed to the caller, which reports them to the gamification engine.
pub struct GameService {
    games: Mutex<HashMap<String, GameRun>>,
}

impl GameService {
    pub fn new() -> Self {
        Self { games: Mutex::new(HashMap::new()) }
    }

    pub async fn start(
        &self,
        kind: GameKind,
        topic: Option<GameTopic>,
    ) -> Result<GameView, GameError> {
        let engine = match kind {
            GameKind::Quiz => {
                let topic = require_topic(topic)?;
                GameEngine::Quiz(QuizEngine::new(content_service::quiz_questions(
                    topic, QUIZ_ROUNDS,
                )))
            }
            GameKind::Matching => {
                let topic = require_topic(topic)?;
                GameEngine::Matching(MatchingEngine::new(content_service::matching_rounds(
                    topic,
                    MATCHING_ROUNDS,
                    MATCHING_ITEMS,
                )))
            }
            GameKind::Memory => {
                let topic = require_topic(topic)?;
                GameEngine::Memory(MemoryEngine::new(
                    content_service::memory_cards(topic, MEMORY_PAIRS),
                    MEMORY_PAIRS,
                ))
            }
            GameKind::Echo => {
                let topic = require_topic(topic)?;
                GameEngine::Echo(EchoEngine::new(content_service::echo_phrases(
                    topic, ECHO_ROUNDS,
                )))
            }
            GameKind::Karaoke => {
                GameEngine::Karaoke(KaraokeEngine::new(content_service::karaoke_lines(
                    KARAOKE_ROUNDS,
                )))
            }
            GameKind::WordBuilder => {
                let topic = require_topic(topic)?;
                GameEngine::WordBuilder(WordBuilderEngine::new(content_service::word_challenges(
                    topic,
                    WORD_BUILDER_ROUNDS,
                )))
            }
            GameKind::BeatMaker => {
                GameEngine::BeatMaker(BeatMakerEngine::new(content_service::beat_patterns(
                    BEAT_MAKER_ROUNDS,
                )))
            }
        };

        let run = GameRun { id: Uuid::new_v4().to_string(), topic, engine };
        let view = run.view();
        tracing::info!("Game {} started: {:?}", run.id, kind);

        let mut games = self.games.lock().await;
        games.insert(run.id.clone(), run);
        Ok(view)
    }

    pub async fn view(&self, id: &str) -> Result<GameView, GameError> {
        let games = self.games.lock().await;
        games.get(id).map(|g| g.view()).ok_or(GameError::NotFound)
    }

    pub async fn quiz_answer(
        &self,
        id: &str,
        choice_id: &str,
    ) -> Result<(Value, GameView, Option<GameSummary>), GameError> {
        self.act(id, |engine| match engine {
            GameEngine::Quiz(quiz) => {
                let outcome = quiz.answer(choice_id)?;
                Ok(serde_json::to_value(outcome).unwrap_or(Value::Null))
            }
            _ => Err(GameError::InvalidAction("Not a quiz game".to_string())),
        })
        .await
    }

    pub async fn matching_match(
        &self,
        id: &str,
        word_id: &str,
        emoji_id: &str,
    ) -> Result<(Value, GameView, Option<GameSummary>), GameError> {
        self.act(id, |engine| match engine {
            GameEngine::Matching(matching) => {
                let outcome = matching.try_match(word_id, emoji_id)?;
                Ok(serde_json::to_value(outcome).unwrap_or(Value::Null))
            }
            _ => Err(GameError::InvalidAction("Not a matching game".to_string())),
        })
        .await
    }

    pub async fn memory_flip(
        &self,
        id: &str,
        card_id: &str,
    ) -> Result<(Value, GameView, Option<GameSummary>), GameError> {
        self.act(id, |engine| match engine {
            GameEngine::Memory(memory) => {
                let outcome = memory.flip(card_id)?;
                Ok(serde_json::to_value(outcome).unwrap_or(Value::Null))
            }
            _ => Err(GameError::InvalidAction("Not a memory game".to_string())),
        })
        .await
    }

    pub async fn echo_submit(
        &self,
        id: &str,
        transcript: &str,
    ) -> Result<(Value, GameView, Option<GameSummary>), GameError> {
        self.act(id, |engine| match engine {
            GameEngine::Echo(echo) => {
                let outcome = echo.submit(transcript)?;
                Ok(serde_json::to_value(outcome).unwrap_or(Value::Null))
            }
            _ => Err(GameError::InvalidAction("Not an echo game".to_string())),
        })
        .await
    }

    pub async fn karaoke_tap(
        &self,
        id: &str,
        word_id: &str,
        beat_index: u32,
    ) -> Result<(Value, GameView, Option<GameSummary>), GameError> {
        self.act(id, |engine| match engine {
            GameEngine::Karaoke(karaoke) => {
                let outcome = karaoke.tap(word_id, beat_index)?;
                Ok(serde_json::to_value(outcome).unwrap_or(Value::Null))
            }
            _ => Err(GameError::InvalidAction("Not a karaoke game".to_string())),
        })
        .await
    }

    pub async fn karaoke_advance(
        &self,
        id: &str,
    ) -> Result<(Value, GameView, Option<GameSummary>), GameError> {
        self.act(id, |engine| match engine {
            GameEngine::Karaoke(karaoke) => {
                karaoke.advance()?;
                Ok(Value::Null)
            }
            _ => Err(GameError::InvalidAction("Not a karaoke game".to_string())),
        })
        .await
    }

    pub async fn word_submit(
        &self,
        id: &str,
        word: &str,
    ) -> Result<(Value, GameView, Option<GameSummary>), GameError> {
        self.act(id, |engine| match engine {
            GameEngine::WordBuilder(builder) => {
                let outcome = builder.submit_word(word)?;
                Ok(serde_json::to_value(outcome).unwrap_or(Value::Null))
            }
            _ => Err(GameError::InvalidAction("Not a word builder game".to_string())),
        })
        .await
    }

    pub async fn beat_submit(
        &self,
        id: &str,
        pattern: &[bool],
    ) -> Result<(Value, GameView, Option<GameSummary>), GameError> {
        self.act(id, |engine| match engine {
            GameEngine::BeatMaker(beat) => {
                let outcome = beat.submit_pattern(pattern)?;
                Ok(serde_json::to_value(outcome).unwrap_or(Value::Null))
            }
            _ => Err(GameError::InvalidAction("Not a beat maker game".to_string())),
        })
        .await
    }

    async fn act<F>(
        &self,
        id: &str,
        action: F,
    ) -> Result<(Value, GameView, Option<GameSummary>), GameError>
    where
        F: FnOnce(&mut GameEngine) -> Result<Value, GameError>,
    {
        let mut games = self.games.lock().await;
        let run = games.get_mut(id).ok_or(GameError::NotFound)?;

        let was_complete = run.engine.is_complete();
        let outcome = action(&mut run.engine)?;

        // Report completion exactly once: only when this action finished it.
        let summary = if !was_complete { run.summary_if_complete() } else { None };
        if let Some(summary) = &summary {
            tracing::info!(
                "Game {} complete: score={}, perfect={}",
                run.id,
                summary.final_score,
                summary.is_perfect
            );
        }
        Ok((outcome, run.view(), summary))
    }
}

impl Default for GameService {
    fn default() -> Self {
        Self::new()
    }
}

fn require_topic(topic: Option<GameTopic>) -> Result<GameTopic, GameError> {
    topic.ok_or_else(|| GameError::InvalidAction("A topic is required for this game".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_game_runs_to_completion() {
        let service = GameService::new();
        let view = service.start(GameKind::Echo, Some(GameTopic::Colors)).await.unwrap();
        assert_eq!(view.total_rounds, ECHO_ROUNDS);
        assert!(!view.complete);

        let mut summary = None;
        let mut game_id = view.game_id.clone();
        for _ in 0..ECHO_ROUNDS {
            let current = service.view(&game_id).await.unwrap();
            let phrase = current.board["phrase"].as_str().unwrap().to_string();
            let (_, view, maybe_summary) =
                service.echo_submit(&game_id, &phrase).await.unwrap();
            game_id = view.game_id;
            summary = maybe_summary;
        }

        let summary = summary.expect("last round completes the game");
        assert!(summary.is_perfect);
        assert_eq!(
            summary.final_score,
            ECHO_ROUNDS as i64 * crate::models::games::ECHO_PERFECT_POINTS
                + crate::models::games::ECHO_PERFECT_GAME_BONUS
        );

        // Acting on a finished game is rejected.
        assert!(matches!(
            service.echo_submit(&game_id, "anything").await,
            Err(GameError::AlreadyComplete)
        ));
    }

    #[tokio::test]
    async fn quiz_requires_topic() {
        let service = GameService::new();
        assert!(matches!(
            service.start(GameKind::Quiz, None).await,
            Err(GameError::InvalidAction(_))
        ));
    }

    #[tokio::test]
    async fn action_on_wrong_game_kind_is_rejected() {
        let service = GameService::new();
        let view = service.start(GameKind::BeatMaker, None).await.unwrap();

        assert!(matches!(
            service.quiz_answer(&view.game_id, "red").await,
            Err(GameError::InvalidAction(_))
        ));
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let service = GameService::new();
        assert!(matches!(service.view("missing").await, Err(GameError::NotFound)));
    }
}

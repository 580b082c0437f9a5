use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::metrics::{BADGES_UNLOCKED_TOTAL, GAMES_COMPLETED_TOTAL};
use crate::models::games::GameKind;
use crate::models::gamification::{
    check_badge_unlocks, level_for_points, points_for_attempt, progress_to_next_level,
    random_message, session_bonus, BadgeDefinition, BadgeRarity, CelebrationEvent,
    CelebrationIntensity, CelebrationType, EarnedBadge, GamificationState, LevelInfo,
    LevelProgress, StatDelta, BADGE_MESSAGES, FAST_ANSWER_SECONDS, LEVEL_UP_MESSAGES,
    SESSION_COMPLETE_MESSAGES, SUCCESS_MESSAGES,
};
use crate::models::interpret::Clarity;
use crate::models::session::SessionAttempt;
use crate::services::storage::Storage;
use crate::utils::retry::{retry_with_backoff, RetryConfig};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamificationOverview {
    pub state: GamificationState,
    pub level: LevelInfo,
    pub level_progress: LevelProgress,
    pub earned_badges: Vec<BadgeDefinition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCompletionOutcome {
    pub bonus_points: i64,
    pub streak_days: u32,
    pub new_badges: Vec<BadgeDefinition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCompletionOutcome {
    pub new_badges: Vec<BadgeDefinition>,
    pub total_games_played: u32,
    pub total_perfect_games: u32,
}

struct Inner {
    state: GamificationState,
    celebrations: VecDeque<CelebrationEvent>,
}

/// Single owner of the cumulative gamification state. Every mutation goes
/// through this service's lock and triggers a full re-save; persistence is
/// optimistic (a failed save is logged, the in-memory state stands).
pub struct GamificationService {
    storage: Arc<dyn Storage>,
    inner: Mutex<Inner>,
}

impl GamificationService {
    pub async fn load(storage: Arc<dyn Storage>) -> Result<Self> {
        let state = storage.get_gamification().await?.unwrap_or_default();
        tracing::info!(
            "Gamification state loaded: {} points, level {}, {} badges",
            state.total_points,
            state.current_level,
            state.earned_badges.len()
        );
        Ok(Self {
            storage,
            inner: Mutex::new(Inner { state, celebrations: VecDeque::new() }),
        })
    }

    /// Score one recorded attempt. Skipped attempts score 0 and leave the
    /// state untouched.
    pub async fn score_attempt(&self, attempt: &SessionAttempt, session_id: Option<&str>) -> i64 {
        let points = points_for_attempt(attempt);
        if points == 0 {
            return 0;
        }

        let snapshot = {
            let mut inner = self.inner.lock().await;
            let previous_level = inner.state.current_level;
            let is_clear = attempt.clarity == Clarity::Clear;
            let is_fast = attempt.duration_seconds < FAST_ANSWER_SECONDS;

            inner.state.total_points += points;
            if is_clear {
                inner.state.total_clear_answers += 1;
            }
            if is_fast {
                inner.state.total_fast_answers += 1;
            }

            let level = level_for_points(inner.state.total_points);
            inner.state.current_level = level.level;

            let new_badges = check_badge_unlocks(&inner.state, &StatDelta::default());
            Self::record_badges(&mut inner.state, &new_badges, session_id);

            if level.level > previous_level {
                inner.celebrations.push_back(CelebrationEvent {
                    kind: CelebrationType::LevelUp,
                    intensity: CelebrationIntensity::Large,
                    points: None,
                    new_level: Some(level.clone()),
                    badge: None,
                    message: random_message(LEVEL_UP_MESSAGES),
                });
            } else {
                inner.celebrations.push_back(CelebrationEvent {
                    kind: CelebrationType::Points,
                    intensity: if is_clear {
                        CelebrationIntensity::Medium
                    } else {
                        CelebrationIntensity::Small
                    },
                    points: Some(points),
                    new_level: None,
                    badge: None,
                    message: random_message(SUCCESS_MESSAGES),
                });
            }
            Self::queue_badge_celebrations(&mut inner.celebrations, &new_badges);

            inner.state.clone()
        };

        self.persist(snapshot).await;
        points
    }

    /// Apply a completed session: session counter, bonus, transactional
    /// streak update and badge evaluation. Idempotent for the streak on
    /// repeated same-day completions.
    pub async fn complete_session(
        &self,
        attempts: &[SessionAttempt],
        session_id: &str,
    ) -> SessionCompletionOutcome {
        let bonus = session_bonus(attempts);
        let today = crate::utils::time::today_str();
        let yesterday = crate::utils::time::yesterday_str();

        let (snapshot, outcome) = {
            let mut inner = self.inner.lock().await;
            let previous_level = inner.state.current_level;

            inner.state.total_sessions += 1;
            inner.state.total_points += bonus;

            if inner.state.last_active_date.as_deref() != Some(today.as_str()) {
                if inner.state.last_active_date.as_deref() == Some(yesterday.as_str()) {
                    inner.state.streak_days += 1;
                } else {
                    inner.state.streak_days = 1;
                }
                inner.state.last_active_date = Some(today.clone());
            }

            let level = level_for_points(inner.state.total_points);
            inner.state.current_level = level.level;

            let new_badges = check_badge_unlocks(&inner.state, &StatDelta::default());
            Self::record_badges(&mut inner.state, &new_badges, Some(session_id));

            if level.level > previous_level {
                inner.celebrations.push_back(CelebrationEvent {
                    kind: CelebrationType::LevelUp,
                    intensity: CelebrationIntensity::Large,
                    points: None,
                    new_level: Some(level.clone()),
                    badge: None,
                    message: random_message(LEVEL_UP_MESSAGES),
                });
            } else {
                inner.celebrations.push_back(CelebrationEvent {
                    kind: CelebrationType::SessionComplete,
                    intensity: if bonus > 0 {
                        CelebrationIntensity::Large
                    } else {
                        CelebrationIntensity::Medium
                    },
                    points: Some(bonus),
                    new_level: None,
                    badge: None,
                    message: random_message(SESSION_COMPLETE_MESSAGES),
                });
            }
            Self::queue_badge_celebrations(&mut inner.celebrations, &new_badges);

            let outcome = SessionCompletionOutcome {
                bonus_points: bonus,
                streak_days: inner.state.streak_days,
                new_badges: new_badges.iter().map(|b| (*b).clone()).collect(),
            };
            (inner.state.clone(), outcome)
        };

        self.persist(snapshot).await;
        outcome
    }

    /// Apply a finished mini game. Game points stay local to the game; only
    /// the play counters feed badge thresholds.
    pub async fn complete_game(
        &self,
        kind: GameKind,
        is_perfect: bool,
        final_score: i64,
    ) -> GameCompletionOutcome {
        GAMES_COMPLETED_TOTAL
            .with_label_values(&[kind.as_str(), if is_perfect { "true" } else { "false" }])
            .inc();

        let (snapshot, outcome) = {
            let mut inner = self.inner.lock().await;

            inner.state.total_games_played += 1;
            if is_perfect {
                inner.state.total_perfect_games += 1;
            }

            let new_badges = check_badge_unlocks(&inner.state, &StatDelta::default());
            Self::record_badges(&mut inner.state, &new_badges, None);

            inner.celebrations.push_back(CelebrationEvent {
                kind: CelebrationType::Points,
                intensity: if is_perfect {
                    CelebrationIntensity::Large
                } else {
                    CelebrationIntensity::Medium
                },
                points: Some(final_score),
                new_level: None,
                badge: None,
                message: random_message(SUCCESS_MESSAGES),
            });
            Self::queue_badge_celebrations(&mut inner.celebrations, &new_badges);

            let outcome = GameCompletionOutcome {
                new_badges: new_badges.iter().map(|b| (*b).clone()).collect(),
                total_games_played: inner.state.total_games_played,
                total_perfect_games: inner.state.total_perfect_games,
            };
            (inner.state.clone(), outcome)
        };

        self.persist(snapshot).await;
        outcome
    }

    pub async fn overview(&self) -> GamificationOverview {
        let inner = self.inner.lock().await;
        let level = level_for_points(inner.state.total_points).clone();
        let level_progress = progress_to_next_level(inner.state.total_points);
        let earned_badges = inner
            .state
            .earned_badges
            .iter()
            .filter_map(|e| crate::models::gamification::badge_by_id(&e.badge_id))
            .cloned()
            .collect();

        GamificationOverview { state: inner.state.clone(), level, level_progress, earned_badges }
    }

    /// Pending celebrations in arrival order (front first).
    pub async fn celebrations(&self) -> Vec<CelebrationEvent> {
        let inner = self.inner.lock().await;
        inner.celebrations.iter().cloned().collect()
    }

    /// Pop the front of the FIFO queue; celebrations are dismissed one at a
    /// time by the client.
    pub async fn dismiss_celebration(&self) -> Option<CelebrationEvent> {
        let mut inner = self.inner.lock().await;
        inner.celebrations.pop_front()
    }

    fn record_badges(
        state: &mut GamificationState,
        badges: &[&'static BadgeDefinition],
        session_id: Option<&str>,
    ) {
        for badge in badges {
            state.earned_badges.push(EarnedBadge {
                badge_id: badge.id.to_string(),
                earned_at: Utc::now(),
                session_id: session_id.map(|s| s.to_string()),
            });
            BADGES_UNLOCKED_TOTAL.with_label_values(&[badge.rarity.as_str()]).inc();
            tracing::info!("Badge unlocked: {} ({:?})", badge.id, badge.rarity);
        }
    }

    fn queue_badge_celebrations(
        queue: &mut VecDeque<CelebrationEvent>,
        badges: &[&'static BadgeDefinition],
    ) {
        for badge in badges {
            queue.push_back(CelebrationEvent {
                kind: CelebrationType::Badge,
                intensity: if badge.rarity == BadgeRarity::Legendary {
                    CelebrationIntensity::Large
                } else {
                    CelebrationIntensity::Medium
                },
                points: None,
                new_level: None,
                badge: Some((*badge).clone()),
                message: random_message(BADGE_MESSAGES),
            });
        }
    }

    async fn persist(&self, snapshot: GamificationState) {
        let result = retry_with_backoff(RetryConfig::persistent(), || async {
            self.storage.save_gamification(&snapshot).await
        })
        .await;

        if let Err(e) = result {
            // Optimistic persistence: the in-memory state stands, the miss
            // is only visible to operators.
            tracing::error!("Failed to save gamification state: {:#}", e);
        }
    }
}

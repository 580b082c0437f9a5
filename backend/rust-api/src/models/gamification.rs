use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::models::interpret::{Clarity, Engagement};
use crate::models::session::SessionAttempt;

/// Attempts answered faster than this count toward speed badges. This is a
/// stricter bar than the scoring bonus below; the two thresholds are
/// intentionally distinct.
pub const FAST_ANSWER_SECONDS: i64 = 15;
/// Attempts answered faster than this earn the speed scoring bonus.
pub const SPEED_BONUS_SECONDS: i64 = 30;

// ============ Level table ============

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: u32,
    pub name: &'static str,
    pub min_points: i64,
    /// `None` for the final level: its interval is unbounded above.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_points: Option<i64>,
    pub icon: &'static str,
}

pub const LEVELS: &[LevelInfo] = &[
    LevelInfo { level: 1, name: "Starter Star", min_points: 0, max_points: Some(50), icon: "\u{2B50}" },
    LevelInfo { level: 2, name: "Word Explorer", min_points: 50, max_points: Some(120), icon: "\u{1F50D}" },
    LevelInfo { level: 3, name: "Voice Adventurer", min_points: 120, max_points: Some(220), icon: "\u{1F392}" },
    LevelInfo { level: 4, name: "Speech Hero", min_points: 220, max_points: Some(350), icon: "\u{1F9B8}" },
    LevelInfo { level: 5, name: "Talk Champion", min_points: 350, max_points: Some(500), icon: "\u{1F3C6}" },
    LevelInfo { level: 6, name: "Word Wizard", min_points: 500, max_points: Some(700), icon: "\u{1F9D9}" },
    LevelInfo { level: 7, name: "Voice Master", min_points: 700, max_points: Some(950), icon: "\u{1F3AF}" },
    LevelInfo { level: 8, name: "Speech Legend", min_points: 950, max_points: Some(1250), icon: "\u{1F451}" },
    LevelInfo { level: 9, name: "Super Speaker", min_points: 1250, max_points: Some(1600), icon: "\u{1F680}" },
    LevelInfo { level: 10, name: "Ultimate Champion", min_points: 1600, max_points: None, icon: "\u{1F48E}" },
];

// ============ Badge catalog ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Streak,
    Clarity,
    Speed,
    Milestone,
    Games,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl BadgeRarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeRarity::Common => "common",
            BadgeRarity::Rare => "rare",
            BadgeRarity::Epic => "epic",
            BadgeRarity::Legendary => "legendary",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: BadgeCategory,
    pub icon: &'static str,
    pub threshold: u32,
    pub rarity: BadgeRarity,
}

pub const BADGES: &[BadgeDefinition] = &[
    // Streak
    BadgeDefinition { id: "streak_3", name: "Getting Started", description: "Practice 3 days in a row", category: BadgeCategory::Streak, icon: "\u{1F525}", threshold: 3, rarity: BadgeRarity::Common },
    BadgeDefinition { id: "streak_7", name: "Week Warrior", description: "Practice for a whole week", category: BadgeCategory::Streak, icon: "\u{1F4AA}", threshold: 7, rarity: BadgeRarity::Rare },
    BadgeDefinition { id: "streak_30", name: "Monthly Master", description: "30 days of practice!", category: BadgeCategory::Streak, icon: "\u{1F3C5}", threshold: 30, rarity: BadgeRarity::Legendary },
    // Clarity
    BadgeDefinition { id: "clarity_10", name: "Clear Talker", description: "Get 10 clear answers", category: BadgeCategory::Clarity, icon: "\u{1F4AC}", threshold: 10, rarity: BadgeRarity::Common },
    BadgeDefinition { id: "clarity_50", name: "Crystal Voice", description: "Get 50 clear answers", category: BadgeCategory::Clarity, icon: "\u{1F48E}", threshold: 50, rarity: BadgeRarity::Epic },
    // Speed
    BadgeDefinition { id: "fast_1", name: "Quick Thinker", description: "Answer in under 15 seconds", category: BadgeCategory::Speed, icon: "\u{26A1}", threshold: 1, rarity: BadgeRarity::Common },
    BadgeDefinition { id: "fast_10", name: "Speed Demon", description: "Get 10 fast answers", category: BadgeCategory::Speed, icon: "\u{1F680}", threshold: 10, rarity: BadgeRarity::Rare },
    // Milestones
    BadgeDefinition { id: "first_session", name: "First Steps", description: "Complete your first session", category: BadgeCategory::Milestone, icon: "\u{1F463}", threshold: 1, rarity: BadgeRarity::Common },
    BadgeDefinition { id: "sessions_10", name: "Dedicated Learner", description: "Complete 10 sessions", category: BadgeCategory::Milestone, icon: "\u{1F4DA}", threshold: 10, rarity: BadgeRarity::Rare },
    BadgeDefinition { id: "sessions_50", name: "Speech Champion", description: "Complete 50 sessions", category: BadgeCategory::Milestone, icon: "\u{1F3C6}", threshold: 50, rarity: BadgeRarity::Legendary },
    BadgeDefinition { id: "level_5", name: "Halfway Hero", description: "Reach level 5", category: BadgeCategory::Milestone, icon: "\u{1F396}\u{FE0F}", threshold: 5, rarity: BadgeRarity::Rare },
    BadgeDefinition { id: "level_10", name: "Ultimate Speaker", description: "Reach the highest level", category: BadgeCategory::Milestone, icon: "\u{1F451}", threshold: 10, rarity: BadgeRarity::Legendary },
    // Games
    BadgeDefinition { id: "games_1", name: "Game Explorer", description: "Play your first game", category: BadgeCategory::Games, icon: "\u{1F3AE}", threshold: 1, rarity: BadgeRarity::Common },
    BadgeDefinition { id: "games_10", name: "Game Fan", description: "Play 10 games", category: BadgeCategory::Games, icon: "\u{1F579}\u{FE0F}", threshold: 10, rarity: BadgeRarity::Rare },
    BadgeDefinition { id: "games_50", name: "Game Master", description: "Play 50 games", category: BadgeCategory::Games, icon: "\u{1F3C6}", threshold: 50, rarity: BadgeRarity::Legendary },
    BadgeDefinition { id: "perfect_1", name: "Perfect Round", description: "Get a perfect score", category: BadgeCategory::Games, icon: "\u{2B50}", threshold: 1, rarity: BadgeRarity::Common },
    BadgeDefinition { id: "perfect_5", name: "Perfectionist", description: "Get 5 perfect games", category: BadgeCategory::Games, icon: "\u{1F31F}", threshold: 5, rarity: BadgeRarity::Rare },
    BadgeDefinition { id: "perfect_20", name: "Flawless Champion", description: "Get 20 perfect games", category: BadgeCategory::Games, icon: "\u{1F4AB}", threshold: 20, rarity: BadgeRarity::Epic },
];

pub fn badge_by_id(id: &str) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|b| b.id == id)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

// ============ Cumulative state ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamificationState {
    pub total_points: i64,
    pub current_level: u32,
    pub earned_badges: Vec<EarnedBadge>,
    pub streak_days: u32,
    /// YYYY-MM-DD of the last completed session. Drives the transactional
    /// streak counter; the dashboard's streak is derived separately from
    /// stored progress dates (see the progress module).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<String>,
    pub total_clear_answers: u32,
    pub total_fast_answers: u32,
    pub total_sessions: u32,
    pub total_games_played: u32,
    pub total_perfect_games: u32,
}

impl Default for GamificationState {
    fn default() -> Self {
        Self {
            total_points: 0,
            current_level: 1,
            earned_badges: Vec::new(),
            streak_days: 0,
            last_active_date: None,
            total_clear_answers: 0,
            total_fast_answers: 0,
            total_sessions: 0,
            total_games_played: 0,
            total_perfect_games: 0,
        }
    }
}

impl GamificationState {
    pub fn has_badge(&self, id: &str) -> bool {
        self.earned_badges.iter().any(|b| b.badge_id == id)
    }
}

/// Stat increments not yet applied to the state, evaluated together with
/// the cumulative counters during badge checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatDelta {
    pub clear_answers: u32,
    pub fast_answers: u32,
    pub sessions: u32,
    pub games_played: u32,
    pub perfect_games: u32,
}

// ============ Celebrations ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CelebrationType {
    Points,
    LevelUp,
    Badge,
    SessionComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelebrationIntensity {
    Small,
    Medium,
    Large,
}

/// One queued celebration. The queue is strictly FIFO and dismissed one at
/// a time by the client; ordering is part of the contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CelebrationEvent {
    #[serde(rename = "type")]
    pub kind: CelebrationType,
    pub intensity: CelebrationIntensity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<LevelInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<BadgeDefinition>,
    pub message: String,
}

// ============ Mascot messages ============

pub const SUCCESS_MESSAGES: &[&str] =
    &["Awesome!", "Great job!", "Well done!", "Super!", "Nice one!", "Amazing!"];
pub const LEVEL_UP_MESSAGES: &[&str] = &["LEVEL UP!", "You're amazing!", "New level!", "Wow!"];
pub const BADGE_MESSAGES: &[&str] = &["New badge!", "You earned it!", "So proud!"];
pub const SESSION_COMPLETE_MESSAGES: &[&str] = &["All done!", "Great session!", "You did it!"];

pub fn random_message(messages: &[&str]) -> String {
    messages
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("Great!")
        .to_string()
}

// ============ Points ============

/// Deterministic per-attempt scoring. Skipped attempts always score 0;
/// a non-skipped attempt scores 10-20 depending on clarity, engagement and
/// speed.
pub fn points_for_attempt(attempt: &SessionAttempt) -> i64 {
    if attempt.skipped {
        return 0;
    }

    let mut points = 10;

    points += match attempt.clarity {
        Clarity::Clear => 5,
        Clarity::Partial => 2,
        Clarity::Unclear => 0,
    };

    if attempt.engagement == Engagement::Engaged {
        points += 3;
    }

    if attempt.duration_seconds < SPEED_BONUS_SECONDS {
        points += 2;
    }

    points
}

/// +10 when every attempt in a non-empty session was answered.
pub fn session_bonus(attempts: &[SessionAttempt]) -> i64 {
    let completed = attempts.iter().filter(|a| !a.skipped).count();
    if completed == attempts.len() && completed > 0 {
        10
    } else {
        0
    }
}

// ============ Levels ============

/// The highest level whose minimum is within `total_points`, scanning the
/// table from the top down.
pub fn level_for_points(total_points: i64) -> &'static LevelInfo {
    LEVELS
        .iter()
        .rev()
        .find(|l| total_points >= l.min_points)
        .unwrap_or(&LEVELS[0])
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub current: i64,
    pub required: i64,
    pub percentage: f64,
}

pub fn progress_to_next_level(total_points: i64) -> LevelProgress {
    let level = level_for_points(total_points);

    let Some(max_points) = level.max_points else {
        // Max level: nothing left to earn.
        return LevelProgress { current: 0, required: 0, percentage: 100.0 };
    };

    let current = total_points - level.min_points;
    let required = max_points - level.min_points;
    let percentage = ((current as f64 / required as f64) * 100.0).clamp(0.0, 100.0);

    LevelProgress { current, required, percentage }
}

// ============ Badge evaluation ============

/// Evaluate every not-yet-earned badge against the cumulative stats plus
/// `delta`. Earned badges are permanent and never re-checked.
pub fn check_badge_unlocks(
    state: &GamificationState,
    delta: &StatDelta,
) -> Vec<&'static BadgeDefinition> {
    let clear_answers = state.total_clear_answers + delta.clear_answers;
    let fast_answers = state.total_fast_answers + delta.fast_answers;
    let sessions = state.total_sessions + delta.sessions;
    let games_played = state.total_games_played + delta.games_played;
    let perfect_games = state.total_perfect_games + delta.perfect_games;

    BADGES
        .iter()
        .filter(|badge| !state.has_badge(badge.id))
        .filter(|badge| match badge.category {
            BadgeCategory::Streak => state.streak_days >= badge.threshold,
            BadgeCategory::Clarity => clear_answers >= badge.threshold,
            BadgeCategory::Speed => fast_answers >= badge.threshold,
            BadgeCategory::Milestone => {
                if badge.id.starts_with("level_") {
                    state.current_level >= badge.threshold
                } else {
                    sessions >= badge.threshold
                }
            }
            BadgeCategory::Games => {
                if badge.id.starts_with("games_") {
                    games_played >= badge.threshold
                } else {
                    perfect_games >= badge.threshold
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attempt(skipped: bool, clarity: Clarity, engagement: Engagement, secs: i64) -> SessionAttempt {
        SessionAttempt {
            id: "a1".into(),
            timestamp: Utc::now(),
            prompt_id: "daily-1".into(),
            prompt_text: "What did you do today?".into(),
            typed_response: None,
            spoken_transcript: if skipped { String::new() } else { "played outside".into() },
            skipped,
            interpretation: String::new(),
            feedback_for_child: String::new(),
            insight_for_parent: String::new(),
            engagement,
            clarity,
            suggested_follow_up: None,
            duration_seconds: secs,
        }
    }

    #[test]
    fn skipped_attempts_score_zero() {
        let a = attempt(true, Clarity::Unclear, Engagement::Disengaged, 3);
        assert_eq!(points_for_attempt(&a), 0);
    }

    #[test]
    fn scoring_matrix() {
        // base only
        assert_eq!(points_for_attempt(&attempt(false, Clarity::Unclear, Engagement::Neutral, 60)), 10);
        // clear + engaged + fast = 10 + 5 + 3 + 2
        assert_eq!(points_for_attempt(&attempt(false, Clarity::Clear, Engagement::Engaged, 12)), 20);
        // partial, slow
        assert_eq!(points_for_attempt(&attempt(false, Clarity::Partial, Engagement::Neutral, 45)), 12);
        // deterministic: same input, same output
        let a = attempt(false, Clarity::Clear, Engagement::Neutral, 20);
        assert_eq!(points_for_attempt(&a), points_for_attempt(&a));
    }

    #[test]
    fn session_bonus_requires_all_answered() {
        let done = attempt(false, Clarity::Clear, Engagement::Engaged, 10);
        let skip = attempt(true, Clarity::Unclear, Engagement::Disengaged, 2);

        assert_eq!(session_bonus(&[done.clone(), done.clone()]), 10);
        assert_eq!(session_bonus(&[done, skip.clone()]), 0);
        assert_eq!(session_bonus(&[skip]), 0);
        assert_eq!(session_bonus(&[]), 0);
    }

    #[test]
    fn level_table_is_contiguous() {
        for pair in LEVELS.windows(2) {
            assert_eq!(pair[0].max_points, Some(pair[1].min_points));
            assert_eq!(pair[0].level + 1, pair[1].level);
        }
        assert!(LEVELS.last().unwrap().max_points.is_none());
    }

    #[test]
    fn level_for_points_is_monotonic() {
        let mut previous = 0;
        for points in (0..2000).step_by(7) {
            let level = level_for_points(points).level;
            assert!(level >= previous, "level dropped at {} points", points);
            previous = level;
        }
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_points(0).level, 1);
        assert_eq!(level_for_points(49).level, 1);
        assert_eq!(level_for_points(50).level, 2);
        assert_eq!(level_for_points(1600).level, 10);
        assert_eq!(level_for_points(1_000_000).level, 10);
    }

    #[test]
    fn progress_to_next_clamps_and_tops_out() {
        let p = progress_to_next_level(25);
        assert_eq!(p.current, 25);
        assert_eq!(p.required, 50);
        assert!((p.percentage - 50.0).abs() < f64::EPSILON);

        let top = progress_to_next_level(5000);
        assert_eq!(top.current, 0);
        assert_eq!(top.required, 0);
        assert!((top.percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn earned_badges_are_never_re_unlocked() {
        let mut state = GamificationState { total_fast_answers: 1, ..Default::default() };

        let first = check_badge_unlocks(&state, &StatDelta::default());
        assert!(first.iter().any(|b| b.id == "fast_1"));

        state.earned_badges.push(EarnedBadge {
            badge_id: "fast_1".into(),
            earned_at: Utc::now(),
            session_id: None,
        });

        let second = check_badge_unlocks(&state, &StatDelta::default());
        assert!(!second.iter().any(|b| b.id == "fast_1"));
    }

    #[test]
    fn milestone_badges_split_on_id_prefix() {
        let state = GamificationState { current_level: 5, total_sessions: 1, ..Default::default() };
        let unlocked = check_badge_unlocks(&state, &StatDelta::default());

        assert!(unlocked.iter().any(|b| b.id == "level_5"));
        assert!(unlocked.iter().any(|b| b.id == "first_session"));
        assert!(!unlocked.iter().any(|b| b.id == "sessions_10"));
    }

    #[test]
    fn delta_counts_toward_thresholds() {
        let state = GamificationState { total_clear_answers: 9, ..Default::default() };
        let delta = StatDelta { clear_answers: 1, ..Default::default() };

        let unlocked = check_badge_unlocks(&state, &delta);
        assert!(unlocked.iter().any(|b| b.id == "clarity_10"));
    }
}

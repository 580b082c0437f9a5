use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::session::{SessionAttempt, SessionRecord};
use crate::utils::time;

/// Keywords matched (case-insensitively) against the child's typed and
/// spoken text to track which topics came up during the day.
pub const TOPIC_KEYWORDS: &[&str] = &[
    "ipad", "videos", "chatgpt", "games", "youtube", "notepad", "writing", "drawing", "school",
    "food", "pizza", "cat", "dog", "blue", "red", "green",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date: String,
    pub attempts: Vec<SessionAttempt>,
    pub prompts_completed: u32,
    pub prompts_skipped: u32,
    /// Seconds of focus time, summed over attempt durations.
    pub total_focus_time: i64,
    pub topics_engaged: Vec<String>,
}

impl DailyProgress {
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            attempts: Vec::new(),
            prompts_completed: 0,
            prompts_skipped: 0,
            total_focus_time: 0,
            topics_engaged: Vec::new(),
        }
    }
}

/// Storage shape: one record per calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub date: String,
    pub stats: DailyProgress,
}

pub fn extract_topics(attempts: &[SessionAttempt]) -> Vec<String> {
    let mut topics = Vec::new();
    for attempt in attempts {
        let text = format!(
            "{} {}",
            attempt.typed_response.as_deref().unwrap_or(""),
            attempt.spoken_transcript
        )
        .to_lowercase();
        for keyword in TOPIC_KEYWORDS {
            if text.contains(keyword) && !topics.iter().any(|t| t == keyword) {
                topics.push((*keyword).to_string());
            }
        }
    }
    topics
}

/// Additive merge of one session into a day's progress. Each record must be
/// folded exactly once: folding the same session twice double-counts.
pub fn fold_session_into_daily(
    existing: Option<DailyProgress>,
    session: &SessionRecord,
) -> DailyProgress {
    let mut progress = existing.unwrap_or_else(|| DailyProgress::empty(&session.date));

    let completed = session.attempts.iter().filter(|a| !a.skipped).count() as u32;
    let skipped = session.attempts.len() as u32 - completed;
    let focus: i64 = session.attempts.iter().map(|a| a.duration_seconds).sum();

    progress.prompts_completed += completed;
    progress.prompts_skipped += skipped;
    progress.total_focus_time += focus;
    progress.attempts.extend(session.attempts.iter().cloned());

    for topic in extract_topics(&session.attempts) {
        if !progress.topics_engaged.contains(&topic) {
            progress.topics_engaged.push(topic);
        }
    }

    progress
}

/// Streak derived from the set of dates that have stored progress: the
/// number of consecutive calendar days, all present, ending at today or
/// yesterday. Independent of the transactional `streak_days` counter kept
/// by the gamification engine; the two are consumed by different surfaces
/// and are not reconciled.
pub fn compute_streak(active_dates: &[String], today: NaiveDate) -> u32 {
    let dates: HashSet<&str> = active_dates.iter().map(String::as_str).collect();

    let today_str = time::format_date(today);
    let yesterday = today - Duration::days(1);
    let yesterday_str = time::format_date(yesterday);

    let mut cursor = if dates.contains(today_str.as_str()) {
        today
    } else if dates.contains(yesterday_str.as_str()) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    while dates.contains(time::format_date(cursor).as_str()) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub prompts_completed: u32,
    pub streak: u32,
    pub sessions_today: u32,
    pub daily_goal: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interpret::{Clarity, Engagement};
    use chrono::Utc;

    fn attempt(skipped: bool, spoken: &str, secs: i64) -> SessionAttempt {
        SessionAttempt {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            prompt_id: "daily-1".into(),
            prompt_text: "What did you do today?".into(),
            typed_response: None,
            spoken_transcript: spoken.to_string(),
            skipped,
            interpretation: String::new(),
            feedback_for_child: String::new(),
            insight_for_parent: String::new(),
            engagement: Engagement::Neutral,
            clarity: Clarity::Partial,
            suggested_follow_up: None,
            duration_seconds: secs,
        }
    }

    fn record(attempts: Vec<SessionAttempt>) -> SessionRecord {
        SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date: "2025-03-05".into(),
            start_time: Utc::now(),
            end_time: Utc::now(),
            attempts,
            completed: true,
        }
    }

    #[test]
    fn fold_counts_completed_and_skipped() {
        let session = record(vec![
            attempt(false, "i played on my ipad", 20),
            attempt(true, "", 5),
            attempt(false, "pizza for lunch", 12),
        ]);

        let progress = fold_session_into_daily(None, &session);
        assert_eq!(progress.prompts_completed, 2);
        assert_eq!(progress.prompts_skipped, 1);
        assert_eq!(progress.total_focus_time, 37);
        assert_eq!(
            progress.prompts_completed + progress.prompts_skipped,
            session.attempts.len() as u32
        );
        assert!(progress.topics_engaged.contains(&"ipad".to_string()));
        assert!(progress.topics_engaged.contains(&"pizza".to_string()));
    }

    #[test]
    fn fold_is_additive_and_double_counts_on_refold() {
        let session = record(vec![attempt(false, "blue", 10)]);

        let once = fold_session_into_daily(None, &session);
        let twice = fold_session_into_daily(Some(once.clone()), &session);

        assert_eq!(once.prompts_completed, 1);
        assert_eq!(twice.prompts_completed, 2);
        assert_eq!(twice.total_focus_time, 20);
        // topics stay deduplicated even when double-folded
        assert_eq!(twice.topics_engaged, vec!["blue".to_string()]);
    }

    #[test]
    fn topics_match_case_insensitively() {
        let session = record(vec![attempt(false, "I love ChatGPT and YouTube", 5)]);
        let progress = fold_session_into_daily(None, &session);
        assert!(progress.topics_engaged.contains(&"chatgpt".to_string()));
        assert!(progress.topics_engaged.contains(&"youtube".to_string()));
    }

    #[test]
    fn streak_zero_without_today_or_yesterday() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let dates = vec!["2025-03-01".to_string(), "2025-03-02".to_string()];
        assert_eq!(compute_streak(&dates, today), 0);
        assert_eq!(compute_streak(&[], today), 0);
    }

    #[test]
    fn streak_counts_consecutive_trailing_days() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let dates: Vec<String> = vec![
            "2025-03-10".into(),
            "2025-03-09".into(),
            "2025-03-08".into(),
            // gap
            "2025-03-05".into(),
        ];
        assert_eq!(compute_streak(&dates, today), 3);
    }

    #[test]
    fn streak_may_end_yesterday() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let dates: Vec<String> = vec!["2025-03-09".into(), "2025-03-08".into()];
        assert_eq!(compute_streak(&dates, today), 2);
    }
}

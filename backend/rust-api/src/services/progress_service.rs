use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::progress::{
    compute_streak, fold_session_into_daily, DailyProgress, ProgressRecord, TodayStats,
};
use crate::models::session::SessionRecord;
use crate::utils::retry::{retry_with_backoff, RetryConfig};
use crate::utils::time;

/// Derives daily and weekly summaries from stored attempts and folds newly
/// persisted sessions into the day's record.
pub struct ProgressService {
    storage: Arc<dyn crate::services::storage::Storage>,
}

impl ProgressService {
    pub fn new(storage: Arc<dyn crate::services::storage::Storage>) -> Self {
        Self { storage }
    }

    /// Fold one session into its day's progress. Must be called exactly
    /// once per persisted `SessionRecord`; refolding double-counts.
    pub async fn fold_session(&self, session: &SessionRecord) -> Result<DailyProgress> {
        let existing = self
            .storage
            .get_progress(&session.date)
            .await
            .context("Failed to load existing daily progress")?
            .map(|r| r.stats);

        let stats = fold_session_into_daily(existing, session);
        let record = ProgressRecord { date: session.date.clone(), stats: stats.clone() };

        retry_with_backoff(RetryConfig::persistent(), || async {
            self.storage.save_progress(&record).await
        })
        .await
        .context("Failed to save daily progress")?;

        tracing::info!(
            "Folded session {} into {}: {} completed, {} skipped today",
            session.id,
            session.date,
            stats.prompts_completed,
            stats.prompts_skipped
        );
        Ok(stats)
    }

    pub async fn daily(&self, date: &str) -> Result<Option<DailyProgress>> {
        Ok(self.storage.get_progress(date).await?.map(|r| r.stats))
    }

    /// Monday-start week containing `date`, one entry per day.
    pub async fn weekly(&self, date: chrono::NaiveDate) -> Result<Vec<Option<DailyProgress>>> {
        let dates = time::week_dates(time::week_start(date));
        let lookups = dates.iter().map(|d| self.storage.get_progress(d));
        let records = futures::future::try_join_all(lookups).await?;
        Ok(records.into_iter().map(|r| r.map(|rec| rec.stats)).collect())
    }

    pub async fn active_dates(&self) -> Result<Vec<String>> {
        let records = self.storage.all_progress().await?;
        Ok(records.into_iter().map(|r| r.date).collect())
    }

    /// The dashboard's derived streak plus today's counters. The streak
    /// here comes from date presence, not from the gamification engine's
    /// transactional counter.
    pub async fn today_stats(&self, daily_goal: u32) -> Result<TodayStats> {
        let today = time::today();
        let today_str = time::format_date(today);

        let progress = self.daily(&today_str).await?;
        let dates = self.active_dates().await?;
        let streak = compute_streak(&dates, today);
        let sessions_today = self.storage.sessions_by_date(&today_str).await?.len() as u32;

        Ok(TodayStats {
            prompts_completed: progress.map(|p| p.prompts_completed).unwrap_or(0),
            streak,
            sessions_today,
            daily_goal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interpret::{Clarity, Engagement};
    use crate::models::session::SessionAttempt;
    use crate::services::storage::{MemoryStorage, Storage};
    use chrono::Utc;

    fn record(date: &str, answered: usize, skipped: usize) -> SessionRecord {
        let mut attempts = Vec::new();
        for i in 0..answered {
            attempts.push(SessionAttempt {
                id: format!("a{}", i),
                timestamp: Utc::now(),
                prompt_id: "daily-1".into(),
                prompt_text: "What did you do today?".into(),
                typed_response: None,
                spoken_transcript: "ipad".into(),
                skipped: false,
                interpretation: String::new(),
                feedback_for_child: String::new(),
                insight_for_parent: String::new(),
                engagement: Engagement::Neutral,
                clarity: Clarity::Partial,
                suggested_follow_up: None,
                duration_seconds: 10,
            });
        }
        for i in 0..skipped {
            attempts.push(SessionAttempt {
                id: format!("s{}", i),
                timestamp: Utc::now(),
                prompt_id: "daily-2".into(),
                prompt_text: "What did you eat for lunch?".into(),
                typed_response: None,
                spoken_transcript: String::new(),
                skipped: true,
                interpretation: String::new(),
                feedback_for_child: String::new(),
                insight_for_parent: "Prompt was skipped".into(),
                engagement: Engagement::Disengaged,
                clarity: Clarity::Unclear,
                suggested_follow_up: None,
                duration_seconds: 4,
            });
        }
        SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date: date.to_string(),
            start_time: Utc::now(),
            end_time: Utc::now(),
            attempts,
            completed: true,
        }
    }

    #[tokio::test]
    async fn folding_accumulates_across_sessions() {
        let storage = Arc::new(MemoryStorage::new());
        let service = ProgressService::new(storage.clone());

        service.fold_session(&record("2025-03-05", 2, 1)).await.unwrap();
        let stats = service.fold_session(&record("2025-03-05", 1, 0)).await.unwrap();

        assert_eq!(stats.prompts_completed, 3);
        assert_eq!(stats.prompts_skipped, 1);
        assert_eq!(stats.attempts.len(), 4);
        assert_eq!(stats.total_focus_time, 2 * 10 + 4 + 10);

        // round-trip: counts grow by exactly attempts.len
        let saved = storage.get_progress("2025-03-05").await.unwrap().unwrap();
        assert_eq!(
            saved.stats.prompts_completed + saved.stats.prompts_skipped,
            4
        );
    }

    #[tokio::test]
    async fn weekly_lines_up_by_date() {
        let storage = Arc::new(MemoryStorage::new());
        let service = ProgressService::new(storage);

        // 2025-03-05 is a Wednesday
        service.fold_session(&record("2025-03-05", 1, 0)).await.unwrap();

        let date = chrono::NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let week = service.weekly(date).await.unwrap();
        assert_eq!(week.len(), 7);
        assert!(week[2].is_some(), "Wednesday should be populated");
        assert!(week[0].is_none());
        assert!(week[6].is_none());
    }

    #[tokio::test]
    async fn today_stats_reflect_stored_progress() {
        let storage = Arc::new(MemoryStorage::new());
        let service = ProgressService::new(storage.clone());

        let today = time::today_str();
        let session = record(&today, 3, 0);
        storage.save_session(&session).await.unwrap();
        service.fold_session(&session).await.unwrap();

        let stats = service.today_stats(2).await.unwrap();
        assert_eq!(stats.prompts_completed, 3);
        assert_eq!(stats.sessions_today, 1);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.daily_goal, 2);
    }
}

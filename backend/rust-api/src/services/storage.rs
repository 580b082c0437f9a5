use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::ReplaceOptions;
use mongodb::Database;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::models::gamification::GamificationState;
use crate::models::progress::ProgressRecord;
use crate::models::session::SessionRecord;
use crate::models::settings::SettingsRecord;

/// Persistence port for every record the core owns. The record shapes are
/// defined by the models; the backing technology is swappable (MongoDB in
/// deployment, in-memory for tests and local development).
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_session(&self, record: &SessionRecord) -> Result<()>;
    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>>;
    async fn sessions_by_date(&self, date: &str) -> Result<Vec<SessionRecord>>;
    async fn all_sessions(&self) -> Result<Vec<SessionRecord>>;

    async fn save_settings(&self, record: &SettingsRecord) -> Result<()>;
    async fn get_settings(&self) -> Result<Option<SettingsRecord>>;

    async fn save_progress(&self, record: &ProgressRecord) -> Result<()>;
    async fn get_progress(&self, date: &str) -> Result<Option<ProgressRecord>>;
    async fn all_progress(&self) -> Result<Vec<ProgressRecord>>;

    async fn save_gamification(&self, state: &GamificationState) -> Result<()>;
    async fn get_gamification(&self) -> Result<Option<GamificationState>>;

    async fn ping(&self) -> Result<()>;
}

// ============ MongoDB backend ============

/// Gamification is a singleton document, wrapped so it gets a stable key.
#[derive(Debug, Serialize, Deserialize)]
struct GamificationDoc {
    #[serde(rename = "_id")]
    id: String,
    state: GamificationState,
}

pub struct MongoStorage {
    db: Database,
}

impl MongoStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn sessions(&self) -> mongodb::Collection<SessionRecord> {
        self.db.collection("sessions")
    }

    fn settings(&self) -> mongodb::Collection<SettingsRecord> {
        self.db.collection("settings")
    }

    fn progress(&self) -> mongodb::Collection<ProgressRecord> {
        self.db.collection("progress")
    }

    fn gamification(&self) -> mongodb::Collection<GamificationDoc> {
        self.db.collection("gamification")
    }
}

#[async_trait]
impl Storage for MongoStorage {
    async fn save_session(&self, record: &SessionRecord) -> Result<()> {
        self.sessions()
            .replace_one(doc! { "id": &record.id }, record)
            .with_options(ReplaceOptions::builder().upsert(true).build())
            .await
            .context("Failed to save session record")?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>> {
        self.sessions()
            .find_one(doc! { "id": id })
            .await
            .context("Failed to query session record")
    }

    async fn sessions_by_date(&self, date: &str) -> Result<Vec<SessionRecord>> {
        let cursor = self
            .sessions()
            .find(doc! { "date": date })
            .await
            .context("Failed to query sessions by date")?;
        cursor.try_collect().await.context("Failed to read session cursor")
    }

    async fn all_sessions(&self) -> Result<Vec<SessionRecord>> {
        let cursor = self
            .sessions()
            .find(doc! {})
            .await
            .context("Failed to query sessions")?;
        cursor.try_collect().await.context("Failed to read session cursor")
    }

    async fn save_settings(&self, record: &SettingsRecord) -> Result<()> {
        self.settings()
            .replace_one(doc! { "id": &record.id }, record)
            .with_options(ReplaceOptions::builder().upsert(true).build())
            .await
            .context("Failed to save settings")?;
        Ok(())
    }

    async fn get_settings(&self) -> Result<Option<SettingsRecord>> {
        self.settings()
            .find_one(doc! { "id": crate::models::settings::SETTINGS_RECORD_ID })
            .await
            .context("Failed to query settings")
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<()> {
        self.progress()
            .replace_one(doc! { "date": &record.date }, record)
            .with_options(ReplaceOptions::builder().upsert(true).build())
            .await
            .context("Failed to save daily progress")?;
        Ok(())
    }

    async fn get_progress(&self, date: &str) -> Result<Option<ProgressRecord>> {
        self.progress()
            .find_one(doc! { "date": date })
            .await
            .context("Failed to query daily progress")
    }

    async fn all_progress(&self) -> Result<Vec<ProgressRecord>> {
        let cursor = self
            .progress()
            .find(doc! {})
            .await
            .context("Failed to query progress records")?;
        cursor.try_collect().await.context("Failed to read progress cursor")
    }

    async fn save_gamification(&self, state: &GamificationState) -> Result<()> {
        let doc = GamificationDoc { id: "current".to_string(), state: state.clone() };
        self.gamification()
            .replace_one(doc! { "_id": "current" }, &doc)
            .with_options(ReplaceOptions::builder().upsert(true).build())
            .await
            .context("Failed to save gamification state")?;
        Ok(())
    }

    async fn get_gamification(&self) -> Result<Option<GamificationState>> {
        let doc = self
            .gamification()
            .find_one(doc! { "_id": "current" })
            .await
            .context("Failed to query gamification state")?;
        Ok(doc.map(|d| d.state))
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}

// ============ In-memory backend ============

#[derive(Default)]
struct MemoryInner {
    sessions: HashMap<String, SessionRecord>,
    settings: Option<SettingsRecord>,
    progress: HashMap<String, ProgressRecord>,
    gamification: Option<GamificationState>,
}

/// Process-local store used by the test suite and `STORAGE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<MemoryInner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_session(&self, record: &SessionRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(id).cloned())
    }

    async fn sessions_by_date(&self, date: &str) -> Result<Vec<SessionRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.values().filter(|s| s.date == date).cloned().collect())
    }

    async fn all_sessions(&self) -> Result<Vec<SessionRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.values().cloned().collect())
    }

    async fn save_settings(&self, record: &SettingsRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.settings = Some(record.clone());
        Ok(())
    }

    async fn get_settings(&self) -> Result<Option<SettingsRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.settings.clone())
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.progress.insert(record.date.clone(), record.clone());
        Ok(())
    }

    async fn get_progress(&self, date: &str) -> Result<Option<ProgressRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.progress.get(date).cloned())
    }

    async fn all_progress(&self) -> Result<Vec<ProgressRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.progress.values().cloned().collect())
    }

    async fn save_gamification(&self, state: &GamificationState) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.gamification = Some(state.clone());
        Ok(())
    }

    async fn get_gamification(&self) -> Result<Option<GamificationState>> {
        let inner = self.inner.read().await;
        Ok(inner.gamification.clone())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn memory_storage_round_trips_records() {
        let storage = MemoryStorage::new();

        let record = SessionRecord {
            id: "s1".into(),
            date: "2025-03-05".into(),
            start_time: Utc::now(),
            end_time: Utc::now(),
            attempts: Vec::new(),
            completed: true,
        };
        storage.save_session(&record).await.unwrap();

        let loaded = storage.get_session("s1").await.unwrap().unwrap();
        assert_eq!(loaded.date, "2025-03-05");
        assert_eq!(storage.sessions_by_date("2025-03-05").await.unwrap().len(), 1);
        assert!(storage.sessions_by_date("2025-03-06").await.unwrap().is_empty());

        assert!(storage.get_gamification().await.unwrap().is_none());
        storage.save_gamification(&GamificationState::default()).await.unwrap();
        assert!(storage.get_gamification().await.unwrap().is_some());
    }
}

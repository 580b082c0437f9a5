use std::sync::Arc;

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;

use crate::models::settings::{
    AppSettings, SettingsRecord, UpdateSettingsRequest, SETTINGS_RECORD_ID,
};
use crate::services::storage::Storage;

pub const DEFAULT_PIN: &str = "1234";

/// Owns the settings singleton. The parent PIN is stored as a bcrypt hash
/// and compared with bcrypt verify, never by plain equality.
pub struct SettingsService {
    storage: Arc<dyn Storage>,
}

impl SettingsService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Current settings; creates and persists the defaults on first read.
    pub async fn current(&self) -> Result<AppSettings> {
        if let Some(record) = self.storage.get_settings().await? {
            return Ok(record.settings);
        }

        let pin_hash = hash(DEFAULT_PIN, DEFAULT_COST).context("Failed to hash default PIN")?;
        let settings = AppSettings::default_with_pin_hash(pin_hash);
        self.save(settings.clone()).await?;
        tracing::info!("Settings initialized with defaults");
        Ok(settings)
    }

    pub async fn update(&self, req: UpdateSettingsRequest) -> Result<AppSettings> {
        let mut settings = self.current().await?;

        if let Some(child_name) = req.child_name {
            settings.child_name = child_name;
        }
        if let Some(prompts_per_session) = req.prompts_per_session {
            settings.prompts_per_session = prompts_per_session;
        }
        if let Some(require_typing) = req.require_typing {
            settings.require_typing = require_typing;
        }
        if let Some(allow_skipping) = req.allow_skipping {
            settings.allow_skipping = allow_skipping;
        }
        if let Some(sound_enabled) = req.sound_enabled {
            settings.sound_enabled = sound_enabled;
        }
        if let Some(animations_enabled) = req.animations_enabled {
            settings.animations_enabled = animations_enabled;
        }
        if let Some(text_size) = req.text_size {
            settings.text_size = text_size;
        }
        if let Some(prompt_difficulty) = req.prompt_difficulty {
            settings.prompt_difficulty = prompt_difficulty;
        }
        if let Some(enable_follow_ups) = req.enable_follow_ups {
            settings.enable_follow_ups = enable_follow_ups;
        }
        if let Some(new_pin) = req.new_pin {
            settings.parent_pin_hash =
                hash(new_pin.as_str(), DEFAULT_COST).context("Failed to hash PIN")?;
            tracing::info!("Parent PIN updated");
        }
        if let Some(save_audio) = req.save_audio {
            settings.save_audio = save_audio;
        }
        if let Some(daily_goal) = req.daily_goal {
            settings.daily_goal = daily_goal;
        }

        self.save(settings.clone()).await?;
        Ok(settings)
    }

    pub async fn verify_pin(&self, pin: &str) -> Result<bool> {
        let settings = self.current().await?;
        verify(pin, &settings.parent_pin_hash).context("Failed to verify PIN")
    }

    async fn save(&self, settings: AppSettings) -> Result<()> {
        let record = SettingsRecord {
            id: SETTINGS_RECORD_ID.to_string(),
            settings,
            last_updated: Utc::now(),
        };
        self.storage.save_settings(&record).await
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Normal,
    Large,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub child_name: String,
    pub prompts_per_session: u8,
    pub require_typing: bool,
    pub allow_skipping: bool,
    pub sound_enabled: bool,
    pub animations_enabled: bool,
    pub text_size: TextSize,
    pub prompt_difficulty: u8,
    pub enable_follow_ups: bool,
    /// bcrypt hash; the plain PIN is never stored or returned.
    pub parent_pin_hash: String,
    pub save_audio: bool,
    pub daily_goal: u32,
}

impl AppSettings {
    pub fn default_with_pin_hash(parent_pin_hash: String) -> Self {
        Self {
            child_name: "Tristan".to_string(),
            prompts_per_session: 3,
            require_typing: true,
            allow_skipping: true,
            sound_enabled: false,
            animations_enabled: true,
            text_size: TextSize::Normal,
            prompt_difficulty: 1,
            enable_follow_ups: false,
            parent_pin_hash,
            save_audio: false,
            daily_goal: 1,
        }
    }
}

/// Storage shape: a singleton record keyed "current".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub id: String,
    pub settings: AppSettings,
    pub last_updated: DateTime<Utc>,
}

pub const SETTINGS_RECORD_ID: &str = "current";

/// What the API exposes: everything except the PIN hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub child_name: String,
    pub prompts_per_session: u8,
    pub require_typing: bool,
    pub allow_skipping: bool,
    pub sound_enabled: bool,
    pub animations_enabled: bool,
    pub text_size: TextSize,
    pub prompt_difficulty: u8,
    pub enable_follow_ups: bool,
    pub save_audio: bool,
    pub daily_goal: u32,
}

impl From<&AppSettings> for SettingsView {
    fn from(s: &AppSettings) -> Self {
        Self {
            child_name: s.child_name.clone(),
            prompts_per_session: s.prompts_per_session,
            require_typing: s.require_typing,
            allow_skipping: s.allow_skipping,
            sound_enabled: s.sound_enabled,
            animations_enabled: s.animations_enabled,
            text_size: s.text_size,
            prompt_difficulty: s.prompt_difficulty,
            enable_follow_ups: s.enable_follow_ups,
            save_audio: s.save_audio,
            daily_goal: s.daily_goal,
        }
    }
}

fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("pin_format"))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, max = 50))]
    pub child_name: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub prompts_per_session: Option<u8>,
    pub require_typing: Option<bool>,
    pub allow_skipping: Option<bool>,
    pub sound_enabled: Option<bool>,
    pub animations_enabled: Option<bool>,
    pub text_size: Option<TextSize>,
    #[validate(range(min = 1, max = 3))]
    pub prompt_difficulty: Option<u8>,
    pub enable_follow_ups: Option<bool>,
    #[validate(custom(function = validate_pin))]
    pub new_pin: Option<String>,
    pub save_audio: Option<bool>,
    #[validate(range(min = 1, max = 20))]
    pub daily_goal: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinUnlockRequest {
    pub pin: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinUnlockResponse {
    pub token: String,
    pub expires_in_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_validation_accepts_four_digits_only() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("0000").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("12a4").is_err());
    }

    #[test]
    fn update_request_validates_ranges() {
        let ok = UpdateSettingsRequest {
            prompts_per_session: Some(5),
            prompt_difficulty: Some(3),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = UpdateSettingsRequest {
            prompts_per_session: Some(9),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn view_omits_pin_hash() {
        let settings = AppSettings::default_with_pin_hash("hash".into());
        let view = SettingsView::from(&settings);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("parentPinHash").is_none());
        assert_eq!(json["childName"], "Tristan");
    }
}

//! The settings snapshot the engine is driven by.
//!
//! Out-of-range values are clamped here and never surface as errors.

pub mod store;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    countdown::CountdownPolicy,
    trigger::{active_config, features::shake_threshold, DebouncePolicy},
};

pub use store::{JsonPhraseStore, MemoryPhraseStore, PhraseStore};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub shake_enabled: bool,
    #[serde(deserialize_with = "lenient_u8")]
    pub shake_sensitivity: u8,
    pub voice_enabled: bool,
    pub voice_phrase: String,
    #[serde(deserialize_with = "lenient_u8")]
    pub voice_sensitivity: u8,
    pub floating_enabled: bool,
    #[serde(deserialize_with = "lenient_u16")]
    pub button_size: u16,
    pub countdown_enabled: bool,
    #[serde(deserialize_with = "lenient_u32")]
    pub countdown_seconds: u32,
    /// Only contacts carrying this category receive the alert; `None` means everyone.
    pub alert_category: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let cfg = active_config();
        Self {
            shake_enabled: false,
            shake_sensitivity: 5,
            voice_enabled: false,
            voice_phrase: cfg.voice.default_phrase.to_string(),
            voice_sensitivity: 5,
            floating_enabled: false,
            button_size: cfg.limits.default_button_size,
            countdown_enabled: true,
            countdown_seconds: cfg.countdown.default_seconds,
            alert_category: None,
        }
    }
}

impl Settings {
    pub fn sanitized(mut self) -> Self {
        let limits = &active_config().limits;
        self.shake_sensitivity = self
            .shake_sensitivity
            .clamp(limits.sensitivity_min, limits.sensitivity_max);
        self.voice_sensitivity = self
            .voice_sensitivity
            .clamp(limits.sensitivity_min, limits.sensitivity_max);
        self.button_size = self
            .button_size
            .clamp(limits.button_size_min, limits.button_size_max);
        self.countdown_seconds = self.countdown_seconds.max(1);
        self.voice_phrase = normalize_phrase(&self.voice_phrase);
        self.alert_category = self
            .alert_category
            .map(|category| category.trim().to_string())
            .filter(|category| !category.is_empty());
        self
    }

    pub fn shake_threshold(&self) -> f64 {
        shake_threshold(self.shake_sensitivity, &active_config().shake)
    }

    pub fn debounce_policy(&self) -> DebouncePolicy {
        DebouncePolicy {
            shake_enabled: self.shake_enabled,
            shake_threshold: self.shake_threshold(),
            voice_enabled: self.voice_enabled,
            phrase: self.voice_phrase.clone(),
        }
    }

    pub fn countdown_policy(&self) -> CountdownPolicy {
        CountdownPolicy {
            enabled: self.countdown_enabled,
            seconds: self.countdown_seconds,
        }
    }
}

/// Trimmed and lowercased; an empty phrase falls back to the default one.
pub fn normalize_phrase(raw: &str) -> String {
    let phrase = raw.trim().to_lowercase();
    if phrase.is_empty() {
        active_config().voice.default_phrase.to_string()
    } else {
        phrase
    }
}

fn lenient_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(u8::MAX)) as u8)
}

fn lenient_u16<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(u16::MAX)) as u16)
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(u32::MAX)) as u32)
}

//! Reader configuration.
//!
//! Every field has a documented default, so an empty JSON object (or no file
//! at all) yields a working configuration.
//!
//! ```json
//! {
//!   "speech": { "pitch": 0.9, "preferredVoice": "Daniel" },
//!   "prosody": { "defaultPauseMs": 200 }
//! }
//! ```

use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::reader::prosody::ProsodyTable;

/// Novelty voices shipped by some engines that are unsuitable for reading prose.
pub const DEFAULT_VOICE_DENYLIST: &[&str] = &[
    "Albert",
    "Bad News",
    "Bahh",
    "Bells",
    "Boing",
    "Bubbles",
    "Cellos",
    "Deranged",
    "Good News",
    "Hysterical",
    "Jester",
    "Organ",
    "Pipe Organ",
    "Superstar",
    "Trinoids",
    "Whisper",
    "Wobble",
    "Zarvox",
];

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Base vocal settings and voice selection rules for the speech adapter.
///
/// ```rust
/// use tts_reader::config::SpeechConfigBuilder;
///
/// let config = SpeechConfigBuilder::default()
///     .pitch(1.0)
///     .preferred_voice("Daniel")
///     .build()?;
/// assert_eq!(config.rate, 1.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default, rename_all = "camelCase")]
#[builder(default)]
pub struct SpeechConfig {
    /// Base pitch. Range: 0.1–2.0, default 0.8.
    pub pitch: f32,
    /// Base rate. Range: 0.1–2.0, default 1.0.
    pub rate: f32,
    /// Base volume. Range: 0.0–1.0, default 1.0.
    pub volume: f32,
    /// Only voices whose language tag starts with this prefix are candidates.
    #[builder(setter(into))]
    pub language_prefix: String,
    /// Skip voices synthesized by a remote service.
    pub local_only: bool,
    /// Voice URI prefix picked ahead of other candidates when present.
    #[builder(setter(into, strip_option))]
    pub preferred_voice: Option<String>,
    /// Voice names never picked.
    pub voice_denylist: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            pitch: 0.8,
            rate: 1.0,
            volume: 1.0,
            language_prefix: "en".to_string(),
            local_only: true,
            preferred_voice: Some("Arthur".to_string()),
            voice_denylist: DEFAULT_VOICE_DENYLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SpeechConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("speech.pitch", self.pitch, 0.1, 2.0)?;
        check_range("speech.rate", self.rate, 0.1, 2.0)?;
        check_range("speech.volume", self.volume, 0.0, 1.0)
    }
}

/// Complete configuration for a [`Reader`](crate::Reader).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub speech: SpeechConfig,
    pub prosody: ProsodyTable,
}

impl ReaderConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded reader config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.speech.validate()?;
        self.prosody.validate()
    }
}

pub(crate) fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} = {value} is outside {min}..={max}"
        )))
    }
}

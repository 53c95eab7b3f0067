use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{check_range, ConfigError};
use crate::speech::{SpeakOptions, VoiceSettings};

/// Silence around blocks whose tag has no table entry.
pub const DEFAULT_PAUSE_MS: u64 = 250;

/// Multipliers applied to the base voice settings for one structural tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProsodyDelta {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Silence before and after the block, in milliseconds.
    pub post_pause_ms: u64,
}

impl ProsodyDelta {
    const fn new(rate: f32, pitch: f32, volume: f32, post_pause_ms: u64) -> Self {
        Self {
            rate,
            pitch,
            volume,
            post_pause_ms,
        }
    }
}

/// Effective vocal settings for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prosody {
    pub settings: VoiceSettings,
    pub pause: Duration,
}

impl Prosody {
    pub fn speak_options(&self) -> SpeakOptions {
        SpeakOptions {
            voice: None,
            pitch: Some(self.settings.pitch),
            rate: Some(self.settings.rate),
            volume: Some(self.settings.volume),
        }
    }
}

/// Per-tag prosody deltas. Headings are read slower and lower, with longer
/// silences for higher-level headings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProsodyTable {
    pub tags: BTreeMap<String, ProsodyDelta>,
    pub default_pause_ms: u64,
}

impl Default for ProsodyTable {
    fn default() -> Self {
        let tags = [
            ("h1", ProsodyDelta::new(0.85, 0.9, 1.0, 1200)),
            ("h2", ProsodyDelta::new(0.9, 0.92, 1.0, 900)),
            ("h3", ProsodyDelta::new(0.92, 0.95, 1.0, 700)),
            ("h4", ProsodyDelta::new(0.95, 0.97, 1.0, 550)),
            ("h5", ProsodyDelta::new(0.97, 1.0, 1.0, 450)),
            ("h6", ProsodyDelta::new(1.0, 1.0, 1.0, 350)),
        ]
        .into_iter()
        .map(|(tag, delta)| (tag.to_string(), delta))
        .collect();

        Self {
            tags,
            default_pause_ms: DEFAULT_PAUSE_MS,
        }
    }
}

impl ProsodyTable {
    /// Scale `base` by the delta for `tag`. Unknown tags keep the base
    /// settings and get the default pause.
    pub fn resolve(&self, tag: &str, base: VoiceSettings) -> Prosody {
        match self.tags.get(tag) {
            Some(delta) => Prosody {
                settings: VoiceSettings {
                    pitch: base.pitch * delta.pitch,
                    rate: base.rate * delta.rate,
                    volume: base.volume * delta.volume,
                }
                .clamped(),
                pause: Duration::from_millis(delta.post_pause_ms),
            },
            None => Prosody {
                settings: base,
                pause: Duration::from_millis(self.default_pause_ms),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (tag, delta) in &self.tags {
            check_range(&format!("prosody.{tag}.rate"), delta.rate, 0.0, 10.0)?;
            check_range(&format!("prosody.{tag}.pitch"), delta.pitch, 0.0, 10.0)?;
            check_range(&format!("prosody.{tag}.volume"), delta.volume, 0.0, 10.0)?;
        }
        Ok(())
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::config::SpeechConfig;
use crate::lock;

use super::platform::{
    Completion, SpeechErrorCode, SpeechPlatform, Utterance, UtteranceEvent, Voice,
};
use super::voices::VoiceCatalog;

pub const PITCH_RANGE: (f32, f32) = (0.1, 2.0);
pub const RATE_RANGE: (f32, f32) = (0.1, 2.0);
pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech synthesis failed: {0}")]
    Failed(SpeechErrorCode),
    #[error("Speech platform dropped the utterance without reporting an outcome")]
    Abandoned,
}

/// Pitch, rate and volume applied to an utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSettings {
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
}

impl VoiceSettings {
    /// Clamp each field into the range the platform accepts.
    pub fn clamped(self) -> Self {
        Self {
            pitch: self.pitch.clamp(PITCH_RANGE.0, PITCH_RANGE.1),
            rate: self.rate.clamp(RATE_RANGE.0, RATE_RANGE.1),
            volume: self.volume.clamp(VOLUME_RANGE.0, VOLUME_RANGE.1),
        }
    }
}

/// Per-utterance overrides. Unset fields use the adapter's current settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakOptions {
    pub voice: Option<Voice>,
    pub pitch: Option<f32>,
    pub rate: Option<f32>,
    pub volume: Option<f32>,
}

struct VoiceState {
    catalog: VoiceCatalog,
    voice: Option<Voice>,
    settings: VoiceSettings,
}

/// Clears the speaking flag and wakes idle waiters when the in-flight
/// utterance settles or its future is dropped.
struct SpeakingGuard<'a> {
    flag: &'a AtomicBool,
    idle: &'a Notify,
}

impl<'a> SpeakingGuard<'a> {
    fn acquire(flag: &'a AtomicBool, idle: &'a Notify) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, idle })
    }
}

impl Drop for SpeakingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.idle.notify_waiters();
    }
}

/// Speaks one utterance at a time through a [`SpeechPlatform`].
///
/// Owns voice selection and the base vocal settings. At most one utterance is
/// in flight per adapter: a [`speak`](Self::speak) issued while another is
/// pending returns immediately without submitting anything.
pub struct SpeechAdapter {
    platform: Arc<dyn SpeechPlatform>,
    config: SpeechConfig,
    speaking: AtomicBool,
    idle: Notify,
    state: Mutex<VoiceState>,
}

impl SpeechAdapter {
    pub fn new(platform: Arc<dyn SpeechPlatform>) -> Self {
        Self::with_config(platform, SpeechConfig::default())
    }

    pub fn with_config(platform: Arc<dyn SpeechPlatform>, config: SpeechConfig) -> Self {
        let settings = VoiceSettings {
            pitch: config.pitch,
            rate: config.rate,
            volume: config.volume,
        }
        .clamped();
        Self {
            platform,
            config,
            speaking: AtomicBool::new(false),
            idle: Notify::new(),
            state: Mutex::new(VoiceState {
                catalog: VoiceCatalog::default(),
                voice: None,
                settings,
            }),
        }
    }

    /// True while an utterance is in flight.
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Acquire)
    }

    /// Wait until no utterance is in flight. Returns at once when idle.
    pub async fn wait_until_idle(&self) {
        loop {
            let released = self.idle.notified();
            if !self.is_speaking() {
                return;
            }
            released.await;
        }
    }

    /// Speak `text` and wait until the platform reports the utterance ended.
    ///
    /// An utterance interrupted by [`stop`](Self::stop) resolves `Ok(())`.
    /// Any other platform error is returned as [`SpeechError::Failed`].
    pub async fn speak(&self, text: &str, options: SpeakOptions) -> Result<(), SpeechError> {
        self.try_speak(text, options).await.map(|_| ())
    }

    /// Like [`speak`](Self::speak), but returns `Ok(false)` when nothing was
    /// submitted because another utterance was already in flight.
    pub(crate) async fn try_speak(
        &self,
        text: &str,
        options: SpeakOptions,
    ) -> Result<bool, SpeechError> {
        let Some(_guard) = SpeakingGuard::acquire(&self.speaking, &self.idle) else {
            log::debug!("Utterance already in flight, ignoring {text:?}");
            return Ok(false);
        };

        let voice = match options.voice {
            Some(voice) => Some(voice),
            None => self.resolve_voice(),
        };
        let base = self.settings();
        let settings = VoiceSettings {
            pitch: options.pitch.unwrap_or(base.pitch),
            rate: options.rate.unwrap_or(base.rate),
            volume: options.volume.unwrap_or(base.volume),
        }
        .clamped();

        log::debug!(
            "Speaking {} chars with voice {:?} (pitch={:.2}, rate={:.2}, volume={:.2})",
            text.len(),
            voice.as_ref().map(|v| v.voice_uri.as_str()),
            settings.pitch,
            settings.rate,
            settings.volume
        );

        let (completion, done) = Completion::channel();
        self.platform.speak(
            Utterance {
                text: text.to_string(),
                voice,
                pitch: settings.pitch,
                rate: settings.rate,
                volume: settings.volume,
            },
            completion,
        );

        match done.await {
            Ok(UtteranceEvent::End) => Ok(true),
            Ok(UtteranceEvent::Error(SpeechErrorCode::Interrupted)) => {
                log::debug!("Utterance interrupted");
                Ok(true)
            }
            Ok(UtteranceEvent::Error(code)) => Err(SpeechError::Failed(code)),
            Err(_) => Err(SpeechError::Abandoned),
        }
    }

    /// Ask the platform to cancel any in-flight utterance. The pending
    /// [`speak`](Self::speak) settles through the interrupted path.
    pub fn stop(&self) {
        log::debug!("Cancelling in-flight speech");
        self.platform.cancel();
    }

    /// Rebuild the candidate list from the platform's catalog. Call this when
    /// the platform signals that its voices changed.
    ///
    /// The selected voice is kept if it is still a candidate; otherwise the
    /// default pick replaces it.
    pub fn refresh_voices(&self) {
        let catalog = VoiceCatalog::from_platform(self.platform.voices(), &self.config);
        let default = catalog
            .pick_default(self.config.preferred_voice.as_deref())
            .cloned();

        let mut state = lock(&self.state);
        let kept = state
            .voice
            .as_ref()
            .and_then(|v| catalog.find_by_uri(&v.voice_uri))
            .cloned();
        state.voice = kept.or(default);
        state.catalog = catalog;

        log::info!(
            "Voice catalog refreshed: {} candidates, using {:?}",
            state.catalog.len(),
            state.voice.as_ref().map(|v| v.voice_uri.as_str())
        );
    }

    /// Candidate voices from the last catalog refresh.
    pub fn voices(&self) -> Vec<Voice> {
        lock(&self.state).catalog.voices().to_vec()
    }

    pub fn voice(&self) -> Option<Voice> {
        lock(&self.state).voice.clone()
    }

    pub fn voice_uri(&self) -> Option<String> {
        lock(&self.state).voice.as_ref().map(|v| v.voice_uri.clone())
    }

    /// Switch to the candidate voice with this URI.
    ///
    /// Returns `false` and keeps the current voice when no candidate matches.
    pub fn set_voice_uri(&self, voice_uri: &str) -> bool {
        let unloaded = lock(&self.state).catalog.is_empty();
        if unloaded {
            self.refresh_voices();
        }

        let mut state = lock(&self.state);
        match state.catalog.find_by_uri(voice_uri).cloned() {
            Some(voice) => {
                log::info!("Switched voice to {voice_uri:?}");
                state.voice = Some(voice);
                true
            }
            None => {
                log::warn!(
                    "Voice {voice_uri:?} is not an available voice, keeping {:?}",
                    state.voice.as_ref().map(|v| v.voice_uri.as_str())
                );
                false
            }
        }
    }

    /// Current base settings.
    pub fn settings(&self) -> VoiceSettings {
        lock(&self.state).settings
    }

    /// Replace the base settings. Values are clamped into range.
    pub fn set_settings(&self, settings: VoiceSettings) {
        lock(&self.state).settings = settings.clamped();
    }

    fn resolve_voice(&self) -> Option<Voice> {
        let current = self.voice();
        if current.is_some() {
            return current;
        }

        self.refresh_voices();
        let voice = self.voice();
        if voice.is_none() {
            log::warn!("No acceptable voice available, using the platform default");
        }
        voice
    }
}

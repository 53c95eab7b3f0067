//! A speech platform that produces no audio.
//!
//! Each utterance "plays" for a duration derived from its word count and
//! rate, so a [`Reader`](crate::Reader) can be driven end to end without a
//! real engine. Useful for demos and for exercising controllers.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::lock;

use super::platform::{Completion, SpeechErrorCode, SpeechPlatform, Utterance, Voice};

/// Words per minute at rate 1.0.
pub const DEFAULT_WORDS_PER_MINUTE: f32 = 180.0;

pub struct SimulatedPlatform {
    voices: Vec<Voice>,
    words_per_minute: f32,
    in_flight: Mutex<Option<oneshot::Sender<()>>>,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPlatform {
    /// Create a platform advertising a small set of local English voices.
    pub fn new() -> Self {
        Self::with_voices(vec![
            Voice {
                name: "Samantha".to_string(),
                lang: "en-US".to_string(),
                voice_uri: "Samantha".to_string(),
                local_service: true,
                default: true,
            },
            Voice {
                name: "Arthur".to_string(),
                lang: "en-GB".to_string(),
                voice_uri: "Arthur".to_string(),
                local_service: true,
                default: false,
            },
        ])
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            in_flight: Mutex::new(None),
        }
    }

    pub fn words_per_minute(mut self, wpm: f32) -> Self {
        self.words_per_minute = wpm.max(1.0);
        self
    }

    /// How long an utterance takes to "speak".
    pub fn duration_of(&self, utterance: &Utterance) -> Duration {
        let words = utterance.text.split_whitespace().count() as f32;
        let wpm = self.words_per_minute * utterance.rate.max(0.1);
        Duration::from_secs_f32(words * 60.0 / wpm)
    }
}

impl SpeechPlatform for SimulatedPlatform {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&self, utterance: Utterance, completion: Completion) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::warn!("No async runtime available for simulated speech");
            completion.error(SpeechErrorCode::SynthesisUnavailable);
            return;
        };

        let duration = self.duration_of(&utterance);
        log::info!(
            "[{}] {} ({:.1}s)",
            utterance
                .voice
                .as_ref()
                .map_or("default", |v| v.name.as_str()),
            utterance.text,
            duration.as_secs_f32()
        );

        let (cancel_tx, cancel_rx) = oneshot::channel();
        // A new utterance replaces the previous one; dropping its sender
        // interrupts it.
        *lock(&self.in_flight) = Some(cancel_tx);

        handle.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => completion.end(),
                _ = cancel_rx => completion.error(SpeechErrorCode::Interrupted),
            }
        });
    }

    fn cancel(&self) {
        if let Some(cancel) = lock(&self.in_flight).take() {
            let _ = cancel.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::platform::UtteranceEvent;

    fn utterance(text: &str, rate: f32) -> Utterance {
        Utterance {
            text: text.to_string(),
            voice: None,
            pitch: 1.0,
            rate,
            volume: 1.0,
        }
    }

    #[test]
    fn duration_scales_with_words_and_rate() {
        let platform = SimulatedPlatform::new().words_per_minute(60.0);
        assert_eq!(
            platform.duration_of(&utterance("one two three", 1.0)),
            Duration::from_secs(3)
        );
        assert_eq!(
            platform.duration_of(&utterance("one two", 2.0)),
            Duration::from_secs(1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn utterance_ends_after_its_duration() {
        let platform = SimulatedPlatform::new();
        let (completion, done) = Completion::channel();
        platform.speak(utterance("hello there", 1.0), completion);
        assert_eq!(done.await.unwrap(), UtteranceEvent::End);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_in_flight_utterance() {
        let platform = SimulatedPlatform::new();
        let (completion, done) = Completion::channel();
        platform.speak(utterance("a long sentence to read", 1.0), completion);
        platform.cancel();
        assert_eq!(
            done.await.unwrap(),
            UtteranceEvent::Error(SpeechErrorCode::Interrupted)
        );
    }

    #[test]
    fn speak_without_runtime_reports_unavailable() {
        let platform = SimulatedPlatform::new();
        let (completion, mut done) = Completion::channel();
        platform.speak(utterance("hello", 1.0), completion);
        assert_eq!(
            done.try_recv().unwrap(),
            UtteranceEvent::Error(SpeechErrorCode::SynthesisUnavailable)
        );
    }
}

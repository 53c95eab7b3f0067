use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// A voice advertised by the platform speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    /// Human-readable name (e.g. `"Arthur"`, `"Samantha"`).
    pub name: String,
    /// BCP 47 language tag (e.g. `"en-GB"`).
    pub lang: String,
    /// Stable identifier used to select the voice.
    pub voice_uri: String,
    /// True when synthesis happens on this machine rather than a remote service.
    pub local_service: bool,
    /// True for the engine's own default voice.
    pub default: bool,
}

/// One request to vocalize a string with the given vocal settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` leaves the choice to the engine.
    pub voice: Option<Voice>,
    /// Range: 0.1–2.0.
    pub pitch: f32,
    /// Range: 0.1–2.0.
    pub rate: f32,
    /// Range: 0.0–1.0.
    pub volume: f32,
}

/// Error codes an engine may report for an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeechErrorCode {
    Canceled,
    /// The utterance was cut short by an explicit cancel request.
    Interrupted,
    AudioBusy,
    AudioHardware,
    Network,
    SynthesisUnavailable,
    SynthesisFailed,
    LanguageUnavailable,
    VoiceUnavailable,
    TextTooLong,
    InvalidArgument,
    NotAllowed,
}

impl std::fmt::Display for SpeechErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Canceled => "canceled",
            Self::Interrupted => "interrupted",
            Self::AudioBusy => "audio-busy",
            Self::AudioHardware => "audio-hardware",
            Self::Network => "network",
            Self::SynthesisUnavailable => "synthesis-unavailable",
            Self::SynthesisFailed => "synthesis-failed",
            Self::LanguageUnavailable => "language-unavailable",
            Self::VoiceUnavailable => "voice-unavailable",
            Self::TextTooLong => "text-too-long",
            Self::InvalidArgument => "invalid-argument",
            Self::NotAllowed => "not-allowed",
        };
        f.write_str(s)
    }
}

/// The terminal event of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceEvent {
    End,
    Error(SpeechErrorCode),
}

/// Single-use handle through which the engine reports how an utterance ended.
///
/// Reporting consumes the handle, so an utterance settles at most once even if
/// the engine would signal both completion and an error. Dropping the handle
/// without reporting is seen by the waiting caller as an abandoned utterance.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<UtteranceEvent>,
}

impl Completion {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<UtteranceEvent>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Report an arbitrary terminal event.
    pub fn finish(self, event: UtteranceEvent) {
        // The waiter may already be gone (its future was dropped); nothing to report to.
        let _ = self.tx.send(event);
    }

    /// Report normal completion.
    pub fn end(self) {
        self.finish(UtteranceEvent::End);
    }

    /// Report a failure.
    pub fn error(self, code: SpeechErrorCode) {
        self.finish(UtteranceEvent::Error(code));
    }
}

/// A platform speech synthesis capability.
///
/// Implementations produce audible output for one utterance at a time and must
/// eventually report exactly one terminal event through the supplied
/// [`Completion`]. Cancellation is best effort; an utterance cut short by
/// [`SpeechPlatform::cancel`] should be reported as
/// [`SpeechErrorCode::Interrupted`].
pub trait SpeechPlatform: Send + Sync {
    /// The engine's full voice catalog. May be empty until the engine has
    /// finished loading its voices.
    fn voices(&self) -> Vec<Voice>;

    /// Submit an utterance. Must not block until it is spoken.
    fn speak(&self, utterance: Utterance, completion: Completion);

    /// Cancel any in-flight utterance.
    fn cancel(&self);
}

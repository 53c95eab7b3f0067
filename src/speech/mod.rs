//! Speech output.
//!
//! [`SpeechAdapter`] wraps a platform speech engine behind the
//! [`SpeechPlatform`] trait: it picks a voice from the engine's catalog,
//! applies vocal settings, and turns the engine's completion events into a
//! single awaitable result per utterance.
//!
//! # Available Platforms
//!
//! Enable platforms via Cargo features:
//! - `simulated` - Silent engine that times utterances by word count

pub mod adapter;
#[cfg(test)]
pub(crate) mod fake;
pub mod platform;
#[cfg(feature = "simulated")]
pub mod simulated;
pub mod voices;

pub use adapter::{SpeakOptions, SpeechAdapter, SpeechError, VoiceSettings};
pub use platform::{
    Completion, SpeechErrorCode, SpeechPlatform, Utterance, UtteranceEvent, Voice,
};
#[cfg(feature = "simulated")]
pub use simulated::SimulatedPlatform;
pub use voices::VoiceCatalog;

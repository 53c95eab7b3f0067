//! Scriptable speech platform for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use super::platform::{Completion, SpeechErrorCode, SpeechPlatform, Utterance, UtteranceEvent, Voice};

/// What the fake does with each submitted utterance.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Behavior {
    /// Settle immediately with this event.
    Finish(UtteranceEvent),
    /// Keep the utterance pending until cancelled.
    Hold,
    /// Drop the completion handle without reporting.
    Drop,
}

pub(crate) struct FakePlatform {
    pub voices: Mutex<Vec<Voice>>,
    pub cancels: AtomicUsize,
    /// Report interruptions from a spawned task instead of inside `cancel()`.
    deferred_cancel: AtomicBool,
    behavior: Mutex<Behavior>,
    spoken: Mutex<Vec<Utterance>>,
    pending: Mutex<Option<Completion>>,
    submitted: Notify,
}

impl FakePlatform {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            voices: Mutex::new(vec![voice("Samantha"), voice("Arthur")]),
            cancels: AtomicUsize::new(0),
            deferred_cancel: AtomicBool::new(false),
            behavior: Mutex::new(behavior),
            spoken: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            submitted: Notify::new(),
        })
    }

    pub fn ending() -> Arc<Self> {
        Self::new(Behavior::Finish(UtteranceEvent::End))
    }

    pub fn holding() -> Arc<Self> {
        Self::new(Behavior::Hold)
    }

    /// Holds utterances; a cancel settles them asynchronously, the way real
    /// engines deliver their interruption event.
    pub fn deferring() -> Arc<Self> {
        let platform = Self::holding();
        platform.deferred_cancel.store(true, Ordering::SeqCst);
        platform
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken().into_iter().map(|u| u.text).collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    /// Wait until an utterance has been submitted.
    pub async fn submitted(&self) {
        self.submitted.notified().await;
    }
}

impl SpeechPlatform for FakePlatform {
    fn voices(&self) -> Vec<Voice> {
        self.voices.lock().unwrap().clone()
    }

    fn speak(&self, utterance: Utterance, completion: Completion) {
        self.spoken.lock().unwrap().push(utterance);
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            Behavior::Finish(event) => completion.finish(event),
            Behavior::Hold => *self.pending.lock().unwrap() = Some(completion),
            Behavior::Drop => drop(completion),
        }
        self.submitted.notify_one();
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        let Some(completion) = self.pending.lock().unwrap().take() else {
            return;
        };
        if self.deferred_cancel.load(Ordering::SeqCst) {
            tokio::spawn(async move { completion.error(SpeechErrorCode::Interrupted) });
        } else {
            completion.error(SpeechErrorCode::Interrupted);
        }
    }
}

pub(crate) fn voice(name: &str) -> Voice {
    Voice {
        name: name.to_string(),
        lang: "en-GB".to_string(),
        voice_uri: name.to_string(),
        local_service: true,
        default: false,
    }
}

//! Sequential block reader.
//!
//! A [`Reader`] owns an ordered list of [`ContentBlock`]s and a cursor into
//! it. [`Reader::read_on`] speaks blocks one after another from the cursor to
//! the end of the list, applying per-tag [prosody](prosody::ProsodyTable), and
//! returns the cursor to the first block once the last one has been spoken.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tts_reader::{ContentBlock, Reader};
//! # use tts_reader::speech::{Completion, SpeechPlatform, Utterance, Voice};
//! # struct Engine;
//! # impl SpeechPlatform for Engine {
//! #     fn voices(&self) -> Vec<Voice> { Vec::new() }
//! #     fn speak(&self, _: Utterance, done: Completion) { done.end() }
//! #     fn cancel(&self) {}
//! # }
//!
//! # async fn run() -> Result<(), tts_reader::speech::SpeechError> {
//! let reader = Arc::new(Reader::new(Arc::new(Engine)));
//! reader.on_change(|index| println!("now at {index:?}"));
//! reader.set_contents(vec![
//!     ContentBlock::new("Getting started", "h1", 0),
//!     ContentBlock::new("Install the package first.", "p", 1),
//! ]);
//! reader.read_on().await?;
//! # Ok(())
//! # }
//! ```

pub mod content;
pub mod prosody;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use crate::config::ReaderConfig;
use crate::lock;
use crate::speech::{SpeechAdapter, SpeechError, SpeechPlatform, Voice};

pub use content::ContentBlock;
pub use prosody::{Prosody, ProsodyDelta, ProsodyTable};

type Observer = Arc<dyn Fn(Option<usize>) + Send + Sync>;

enum ReadOutcome {
    Spoken,
    /// Another utterance was in flight; nothing was submitted.
    Busy,
    Empty,
    Stopped,
}

/// Marks the autoplay loop as running. Clears `reading` on drop unless a
/// `stop()` has happened since, so a newer loop keeps its flag.
struct ReadingGuard<'a> {
    reader: &'a Reader,
    run: u64,
}

impl<'a> ReadingGuard<'a> {
    fn acquire(reader: &'a Reader) -> Option<Self> {
        if reader.reading.swap(true, Ordering::AcqRel) {
            return None;
        }
        let run = reader.stops.load(Ordering::Acquire);
        Some(Self { reader, run })
    }
}

impl Drop for ReadingGuard<'_> {
    fn drop(&mut self) {
        if self.reader.stops.load(Ordering::Acquire) == self.run {
            self.reader.reading.store(false, Ordering::Release);
        }
    }
}

struct Cursor {
    contents: Vec<ContentBlock>,
    /// `None` iff `contents` is empty.
    index: Option<usize>,
}

impl Cursor {
    fn first_index(&self) -> Option<usize> {
        if self.contents.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

pub struct Reader {
    speech: SpeechAdapter,
    prosody: ProsodyTable,
    cursor: Mutex<Cursor>,
    reading: AtomicBool,
    /// Bumped by every `stop()`; lets in-flight work notice it was stopped.
    stops: AtomicU64,
    stop_signal: Notify,
    observers: Mutex<Vec<Observer>>,
}

impl Reader {
    /// Create an empty reader with the default configuration.
    pub fn new(platform: Arc<dyn SpeechPlatform>) -> Self {
        Self::with_config(platform, ReaderConfig::default())
    }

    pub fn with_config(platform: Arc<dyn SpeechPlatform>, config: ReaderConfig) -> Self {
        Self {
            speech: SpeechAdapter::with_config(platform, config.speech),
            prosody: config.prosody,
            cursor: Mutex::new(Cursor {
                contents: Vec::new(),
                index: None,
            }),
            reading: AtomicBool::new(false),
            stops: AtomicU64::new(0),
            stop_signal: Notify::new(),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Start with `blocks` already loaded.
    pub fn with_contents(self, blocks: Vec<ContentBlock>) -> Self {
        self.set_contents(blocks);
        self
    }

    /// Replace the content list and move the cursor to the first block.
    ///
    /// Observers are not notified; a content swap is setup, not navigation.
    pub fn set_contents(&self, blocks: Vec<ContentBlock>) {
        let mut cursor = lock(&self.cursor);
        cursor.contents = blocks;
        cursor.index = cursor.first_index();
        log::debug!(
            "Loaded {} blocks, cursor at {:?}",
            cursor.contents.len(),
            cursor.index
        );
    }

    pub fn len(&self) -> usize {
        lock(&self.cursor).contents.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.cursor).contents.is_empty()
    }

    /// Cursor position, `None` when there is no content.
    pub fn index(&self) -> Option<usize> {
        lock(&self.cursor).index
    }

    pub fn current_block(&self) -> Option<ContentBlock> {
        let cursor = lock(&self.cursor);
        cursor.index.and_then(|i| cursor.contents.get(i)).cloned()
    }

    /// True while the autoplay loop is running.
    pub fn is_reading(&self) -> bool {
        self.reading.load(Ordering::Acquire)
    }

    pub fn speech(&self) -> &SpeechAdapter {
        &self.speech
    }

    /// Register an observer called with the new cursor whenever it moves.
    /// Observers run synchronously, in registration order.
    pub fn on_change<F>(&self, observer: F)
    where
        F: Fn(Option<usize>) + Send + Sync + 'static,
    {
        lock(&self.observers).push(Arc::new(observer));
    }

    /// Stop playback and move to the next block. Stays on the last block.
    pub fn next(&self) {
        self.stop();
        self.step_forward();
    }

    /// Stop playback and move to the previous block. Stays on the first block.
    pub fn prev(&self) {
        self.stop();
        let index = {
            let mut cursor = lock(&self.cursor);
            cursor.index = cursor.index.map(|i| i.saturating_sub(1));
            cursor.index
        };
        self.moved(index);
    }

    /// Cancel speech and end the autoplay loop. Safe to call at any time.
    pub fn stop(&self) {
        self.stops.fetch_add(1, Ordering::AcqRel);
        self.speech.stop();
        self.reading.store(false, Ordering::Release);
        self.stop_signal.notify_waiters();
    }

    /// Move the cursor back to the first block.
    pub fn reset(&self) {
        let index = {
            let mut cursor = lock(&self.cursor);
            cursor.index = cursor.first_index();
            cursor.index
        };
        self.moved(index);
    }

    /// Stop playback and switch to the voice with this URI.
    ///
    /// Returns `false` and keeps the current voice when the URI is unknown.
    pub fn set_voice_uri(&self, voice_uri: &str) -> bool {
        self.stop();
        self.speech.set_voice_uri(voice_uri)
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.speech.voices()
    }

    pub fn voice_uri(&self) -> Option<String> {
        self.speech.voice_uri()
    }

    /// Prosody the block would be spoken with, given the current base settings.
    pub fn prosody_for(&self, block: &ContentBlock) -> Prosody {
        self.prosody.resolve(&block.tag, self.speech.settings())
    }

    /// Speak the block under the cursor, surrounded by its pause.
    ///
    /// Does nothing if an utterance is already in flight or there is no
    /// content. A `stop()` during the leading pause skips the utterance.
    pub async fn read_current(&self) -> Result<(), SpeechError> {
        self.read_block().await.map(|_| ())
    }

    async fn read_block(&self) -> Result<ReadOutcome, SpeechError> {
        if self.speech.is_speaking() {
            log::debug!("Already speaking, ignoring read request");
            return Ok(ReadOutcome::Busy);
        }

        let stops = self.stops.load(Ordering::Acquire);
        let Some(block) = self.current_block() else {
            log::warn!("No content found at index {:?}", self.index());
            return Ok(ReadOutcome::Empty);
        };
        let prosody = self.prosody_for(&block);

        if !self.silence(prosody.pause, stops).await {
            return Ok(ReadOutcome::Stopped);
        }
        if !self
            .speech
            .try_speak(&block.text, prosody.speak_options())
            .await?
        {
            return Ok(ReadOutcome::Busy);
        }
        self.silence(prosody.pause, stops).await;
        Ok(ReadOutcome::Spoken)
    }

    /// Read from the cursor to the end of the content.
    ///
    /// Returns when the last block has been spoken (the cursor is then reset
    /// to the first block), when [`stop`](Self::stop) is called, or with the
    /// first speech failure. Calling it while already reading does nothing.
    /// An utterance still unwinding from an earlier stop is waited out before
    /// the first block is read.
    pub async fn read_on(&self) -> Result<(), SpeechError> {
        let Some(reading) = ReadingGuard::acquire(self) else {
            log::debug!("Already reading, ignoring play request");
            return Ok(());
        };
        let run = reading.run;
        log::debug!("Reading on from {:?}", self.index());

        while self.still_reading(run) {
            self.speech.wait_until_idle().await;
            if !self.still_reading(run) {
                break;
            }

            let current = self.index();
            match self.read_block().await? {
                ReadOutcome::Spoken | ReadOutcome::Empty => {}
                ReadOutcome::Busy | ReadOutcome::Stopped => continue,
            }
            if !self.still_reading(run) {
                break;
            }
            if self.step_forward() == current {
                self.stop();
                self.reset();
            }
        }

        log::debug!("Stopped reading at {:?}", self.index());
        Ok(())
    }

    fn still_reading(&self, run: u64) -> bool {
        self.is_reading() && self.stops.load(Ordering::Acquire) == run
    }

    fn step_forward(&self) -> Option<usize> {
        let index = {
            let mut cursor = lock(&self.cursor);
            let last = cursor.contents.len().saturating_sub(1);
            cursor.index = cursor.index.map(|i| (i + 1).min(last));
            cursor.index
        };
        self.moved(index);
        index
    }

    fn moved(&self, index: Option<usize>) {
        log::debug!("Cursor at {index:?}");
        let observers = lock(&self.observers).clone();
        for observer in &observers {
            observer(index);
        }
    }

    /// Wait out `duration`. Returns `false` early if `stop()` was called since
    /// `stops` was sampled.
    async fn silence(&self, duration: Duration, stops: u64) -> bool {
        let stopped = self.stop_signal.notified();
        if self.stops.load(Ordering::Acquire) != stops {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => self.stops.load(Ordering::Acquire) == stops,
            _ = stopped => false,
        }
    }
}

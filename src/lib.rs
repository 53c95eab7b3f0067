//! # tts-reader
//!
//! A Rust library that reads a document aloud block by block through a
//! platform speech engine.
//!
//! ## Features
//!
//! - **Sequential playback**: play, stop, next and previous over an ordered list
//!   of content blocks, with live position notifications
//! - **Structural prosody**: headings are spoken slower and lower, with longer
//!   silences around them
//! - **Pluggable engines**: any speech engine behind the [`SpeechPlatform`]
//!   trait; cancellation resolves cleanly instead of failing
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! tts-reader = { version = "2026.2", features = ["simulated"] }
//! ```
//!
//! ```ignore
//! use std::sync::Arc;
//! use tts_reader::{speech::SimulatedPlatform, ContentBlock, Reader};
//!
//! let reader = Reader::new(Arc::new(SimulatedPlatform::new()));
//! reader.set_contents(vec![
//!     ContentBlock::new("Chapter One", "h1", 0),
//!     ContentBlock::new("It was a bright cold day in April.", "p", 1),
//! ]);
//! reader.read_on().await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod reader;
pub mod speech;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use config::{ConfigError, ReaderConfig, SpeechConfig};
pub use reader::{ContentBlock, Prosody, ProsodyTable, Reader};
pub use speech::{SpeechAdapter, SpeechError, SpeechPlatform};

/// Lock a mutex, recovering the data if a panicking holder poisoned it. The
/// guarded state is plain data that stays consistent between statements.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//! # Clavier
//!
//! Clavier is a polyphonic tone-generation and performance-capture engine.
//! It turns discrete note-on/note-off events into oscillator voices mixed
//! through a shared master gain stage, and can record a performance as a
//! timestamped event log for deterministic replay.
//!
//! The public entry point is [`engine::Engine`]: note on/off, drone
//! toggling, record/stop/play/clear, and the volume/waveform controls. The
//! control surface is synchronous and safe to drive from unpredictable
//! overlapping input; actual rendering happens on a separate real-time
//! path reached only through lock-free channels and atomics.
//!
//! ## Modules
//!
//! - `types`: pure data types - note ids, note-name parsing, waveforms.
//! - `audio`: render-path DSP - oscillators, amplitude ramps, voices, the
//!   synthesis core, and the cpal/offline output backends.
//! - `engine`: the control path - facade, registries, recorder, playback
//!   scheduling.
//! - `repl`: interactive command-line driver for the engine.

pub mod audio;
pub mod engine;
pub mod repl;
pub mod types;

// Re-export commonly used types for convenience
pub use crate::engine::{Engine, EngineStatus, RecordedEvent};
pub use crate::types::{NoteId, Waveform};

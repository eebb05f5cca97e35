//! Engine facade: the public control surface for the synthesis,
//! recording, and playback core.
//!
//! All operations here are synchronous, non-blocking calls on the caller's
//! thread; they enqueue render-path changes over a lock-free channel and
//! never touch audio rendering directly. Invalid calls (double note-on,
//! note-off with no voice, record while playing, ...) degrade to silent
//! no-ops so the surface stays safe under rapid, overlapping real-world
//! input. The only surfaced errors are audio-device failures.

pub mod playback;
pub mod recorder;
pub mod registry;

use crate::audio::output::{self, OfflineRenderer, OutputStream};
use crate::audio::synth::{SynthCommand, SynthCore, SynthEvent};
use crate::types::{NoteId, Waveform};
use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use recorder::Recorder;
use registry::NoteRegistry;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

pub use recorder::RecordedEvent;

const DEFAULT_VOLUME: f32 = 0.5;

/// Process-wide engine state machine. Recording and playing are mutually
/// exclusive; live note input is accepted in any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineStatus {
    #[default]
    Idle,
    Recording,
    Playing,
}

impl EngineStatus {
    pub fn name(&self) -> &'static str {
        match self {
            EngineStatus::Idle => "idle",
            EngineStatus::Recording => "recording",
            EngineStatus::Playing => "playing",
        }
    }
}

/// Pieces needed to build the synthesis core once the output backend is
/// known. Held until the first sounding operation (lazy init).
struct CoreParts {
    command_rx: Receiver<SynthCommand>,
    event_tx: Sender<SynthEvent>,
    clock: Arc<AtomicU64>,
    master_gain: Arc<AtomicU32>,
}

enum Output {
    /// Audio pipeline not yet constructed
    Pending(CoreParts),
    /// Live cpal stream owning the core
    Live(OutputStream),
    /// Core handed to an external renderer (offline mode)
    Detached,
}

/// Public entry point exposed to the UI layer.
///
/// Owns the voice registry, drone registry, recorder, master gain, global
/// waveform, and status; nothing else aliases them. The render path is
/// reached only through the command channel and the shared atomics.
pub struct Engine {
    command_tx: Sender<SynthCommand>,
    event_rx: Receiver<SynthEvent>,
    /// Engine clock published by the render path, f64 seconds as bits
    clock: Arc<AtomicU64>,
    /// Master bus gain, f32 bits; single writer (this thread), read by
    /// the render path
    master_gain: Arc<AtomicU32>,
    waveform: Waveform,
    voices: NoteRegistry,
    drones: NoteRegistry,
    recorder: Recorder,
    status: EngineStatus,
    next_voice_id: u64,
    output: Output,
}

impl Engine {
    /// Create an engine that lazily opens the default audio device on the
    /// first operation that makes sound.
    pub fn new() -> Self {
        let (mut engine, parts) = Self::build();
        engine.output = Output::Pending(parts);
        engine
    }

    /// Create an engine wired to an offline renderer instead of a device.
    ///
    /// The engine clock advances only when the renderer renders, which
    /// makes recording and playback timing fully deterministic.
    pub fn offline(sample_rate: f32) -> (Self, OfflineRenderer) {
        let (mut engine, parts) = Self::build();
        engine.output = Output::Detached;
        let core = SynthCore::new(
            sample_rate,
            parts.clock,
            parts.master_gain,
            parts.command_rx,
            parts.event_tx,
        );
        (engine, OfflineRenderer::new(core))
    }

    fn build() -> (Self, CoreParts) {
        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let clock = Arc::new(AtomicU64::new(0.0f64.to_bits()));
        let master_gain = Arc::new(AtomicU32::new(DEFAULT_VOLUME.to_bits()));

        let parts = CoreParts {
            command_rx,
            event_tx,
            clock: clock.clone(),
            master_gain: master_gain.clone(),
        };
        let engine = Engine {
            command_tx,
            event_rx,
            clock,
            master_gain,
            waveform: Waveform::default(),
            voices: NoteRegistry::new(),
            drones: NoteRegistry::new(),
            recorder: Recorder::new(),
            status: EngineStatus::Idle,
            next_voice_id: 1,
            output: Output::Detached,
        };
        (engine, parts)
    }

    /// Construct the audio pipeline on first use; later calls reuse it
    fn ensure_output(&mut self) -> Result<()> {
        if let Output::Pending(_) = self.output {
            let parts = match std::mem::replace(&mut self.output, Output::Detached) {
                Output::Pending(parts) => parts,
                _ => unreachable!(),
            };
            let sample_rate = output::default_sample_rate()?;
            let core = SynthCore::new(
                sample_rate,
                parts.clock,
                parts.master_gain,
                parts.command_rx,
                parts.event_tx,
            );
            self.output = Output::Live(output::open_stream(core)?);
        }
        Ok(())
    }

    /// Current engine clock in seconds
    fn now(&self) -> f64 {
        f64::from_bits(self.clock.load(Ordering::Acquire))
    }

    /// Apply render-path events that arrived since the last call
    fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                SynthEvent::PlaybackFinished => {
                    if self.status == EngineStatus::Playing {
                        self.status = EngineStatus::Idle;
                    }
                }
            }
        }
    }

    fn fresh_voice_id(&mut self) -> u64 {
        let id = self.next_voice_id;
        self.next_voice_id += 1;
        id
    }

    /// Start a voice for the note. Ignored if the note is already sounding.
    ///
    /// Accepted in any status; the event is captured into the recording
    /// log only while recording.
    pub fn note_on(&mut self, note: impl Into<NoteId>, frequency: f32) -> Result<()> {
        self.drain_events();
        let note = note.into();
        if self.voices.contains(&note) {
            return Ok(());
        }
        self.ensure_output()?;

        let now = self.now();
        let id = self.fresh_voice_id();
        let _ = self.command_tx.send(SynthCommand::VoiceOn {
            id,
            frequency,
            waveform: self.waveform,
            start_at: now,
            release_at: None,
        });
        self.voices.insert(note.clone(), id);

        if self.status == EngineStatus::Recording {
            self.recorder.capture_note_on(&note, frequency, now);
        }
        Ok(())
    }

    /// Release a note. Ignored if the note is not sounding.
    ///
    /// The registry entry is removed immediately even though the 50ms
    /// release tail keeps sounding; the same note can be retriggered at
    /// once, briefly overlapping with its own tail.
    pub fn note_off(&mut self, note: impl Into<NoteId>) {
        self.drain_events();
        let note = note.into();
        if let Some(id) = self.voices.remove(&note) {
            let _ = self.command_tx.send(SynthCommand::VoiceRelease { id });
            if self.status == EngineStatus::Recording {
                self.recorder.capture_note_off(&note, self.now());
            }
        }
    }

    /// Toggle a sustained sine drone for the note.
    ///
    /// Drones are cut, not released, and are never captured by the
    /// recorder or affected by record/play/clear.
    pub fn toggle_drone(&mut self, note: impl Into<NoteId>, frequency: f32) -> Result<()> {
        self.drain_events();
        let note = note.into();
        if let Some(id) = self.drones.remove(&note) {
            let _ = self.command_tx.send(SynthCommand::DroneOff { id });
            return Ok(());
        }
        self.ensure_output()?;
        let id = self.fresh_voice_id();
        let _ = self.command_tx.send(SynthCommand::DroneOn { id, frequency });
        self.drones.insert(note, id);
        Ok(())
    }

    /// Begin capturing note events. No-op unless idle.
    pub fn start_recording(&mut self) -> Result<()> {
        self.drain_events();
        if self.status != EngineStatus::Idle {
            return Ok(());
        }
        self.ensure_output()?;
        self.recorder.start(self.now());
        self.status = EngineStatus::Recording;
        Ok(())
    }

    /// Stop capturing, closing any still-open events at the stop clock.
    /// No-op unless recording.
    pub fn stop_recording(&mut self) {
        self.drain_events();
        if self.status != EngineStatus::Recording {
            return;
        }
        self.recorder.finish(self.now());
        self.status = EngineStatus::Idle;
    }

    /// Replay the captured log through fresh voices at their original
    /// offsets, using the waveform selected now. No-op when the log is
    /// empty, nothing in it is playable, or the engine is not idle.
    ///
    /// Playback is fire-and-forget: status reverts to idle when the
    /// render path passes the end of the last scheduled voice. Live key
    /// presses during playback are still accepted and never collide with
    /// the scheduled voices.
    pub fn play(&mut self) -> Result<()> {
        self.drain_events();
        if self.status != EngineStatus::Idle || self.recorder.is_empty() {
            return Ok(());
        }
        self.ensure_output()?;

        let playback_start = self.now();
        let ends_at = playback::schedule_log(
            self.recorder.events(),
            playback_start,
            self.waveform,
            &mut self.next_voice_id,
            &self.command_tx,
        );
        if let Some(ends_at) = ends_at {
            let _ = self.command_tx.send(SynthCommand::ArmCompletion { at: ends_at });
            self.status = EngineStatus::Playing;
        }
        Ok(())
    }

    /// Discard the recording log. No-op while recording or playing.
    pub fn clear_recording(&mut self) {
        self.drain_events();
        if self.status == EngineStatus::Idle {
            self.recorder.clear();
        }
    }

    /// Set the master bus gain, clamped to [0, 1]. Applies instantly to
    /// everything currently sounding and everything started later.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.master_gain.store(volume.to_bits(), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.master_gain.load(Ordering::Relaxed))
    }

    /// Select the waveform for subsequently started voices. Voices already
    /// sounding keep the waveform they were started with.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn status(&mut self) -> EngineStatus {
        self.drain_events();
        self.status
    }

    /// Note ids with a live voice in the registry (release tails excluded)
    pub fn sounding_notes(&self) -> Vec<NoteId> {
        self.voices.note_ids()
    }

    /// Note ids with an active drone
    pub fn active_drones(&self) -> Vec<NoteId> {
        self.drones.note_ids()
    }

    /// Whether a non-empty recording log exists (including one in progress)
    pub fn has_recording(&self) -> bool {
        !self.recorder.is_empty()
    }

    /// The captured log; read-only outside the recorder
    pub fn recording(&self) -> &[RecordedEvent] {
        self.recorder.events()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

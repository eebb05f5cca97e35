//! Render-path synthesis core.
//!
//! `SynthCore` owns every sounding voice and drone and renders the mixed,
//! gain-scaled output. It is driven either by the cpal callback or by the
//! offline renderer, and communicates with the control path exclusively
//! through lock-free primitives: a crossbeam command channel in, a crossbeam
//! event channel out, and two shared atomics (master gain, engine clock).
//! No locks are held on this path.

use super::oscillator::Oscillator;
use super::voice::Voice;
use crate::types::Waveform;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Commands the control path sends to the render path.
///
/// All times are in engine-clock seconds; the core converts them to sample
/// indices once, when the command is drained, so scheduled starts and
/// releases land on exact samples rather than callback boundaries.
#[derive(Debug, Clone)]
pub enum SynthCommand {
    /// Start a voice. `start_at` in the past (or zero) means "immediately".
    /// A pre-scheduled `release_at` is used by playback voices.
    VoiceOn {
        id: u64,
        frequency: f32,
        waveform: Waveform,
        start_at: f64,
        release_at: Option<f64>,
    },
    /// Begin the release ramp of a live voice
    VoiceRelease { id: u64 },
    /// Start a sustained sine drone
    DroneOn { id: u64, frequency: f32 },
    /// Cut a drone immediately (no release ramp)
    DroneOff { id: u64 },
    /// Arm the playback completion deadline; replaces any armed deadline
    ArmCompletion { at: f64 },
}

/// Events the render path reports back to the control path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthEvent {
    /// The armed completion deadline has passed; playback is over
    PlaybackFinished,
}

pub struct SynthCore {
    sample_rate: f32,
    /// Samples rendered since the core was created
    clock: u64,
    /// Engine clock published to the control path, f64 seconds as bits
    shared_clock: Arc<AtomicU64>,
    /// Master bus gain, f32 bits, written by the control path
    master_gain: Arc<AtomicU32>,
    command_rx: Receiver<SynthCommand>,
    event_tx: Sender<SynthEvent>,
    voices: Vec<Voice>,
    drones: Vec<(u64, Oscillator)>,
    completion_at: Option<u64>,
}

impl SynthCore {
    pub fn new(
        sample_rate: f32,
        shared_clock: Arc<AtomicU64>,
        master_gain: Arc<AtomicU32>,
        command_rx: Receiver<SynthCommand>,
        event_tx: Sender<SynthEvent>,
    ) -> Self {
        Self {
            sample_rate,
            clock: 0,
            shared_clock,
            master_gain,
            command_rx,
            event_tx,
            voices: Vec::new(),
            drones: Vec::new(),
            completion_at: None,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn secs_to_sample(&self, secs: f64) -> u64 {
        (secs * self.sample_rate as f64).round().max(0.0) as u64
    }

    /// Render one block of mono samples.
    ///
    /// Drains pending commands, mixes all voices and drones through the
    /// master gain, advances and publishes the engine clock, and fires the
    /// completion event if the armed deadline was crossed in this block.
    pub fn render(&mut self, out: &mut [f32]) {
        self.drain_commands();

        let gain = f32::from_bits(self.master_gain.load(Ordering::Relaxed));

        for sample in out.iter_mut() {
            let mut mixed = 0.0;
            for voice in &mut self.voices {
                mixed += voice.sample_at(self.clock);
            }
            for (_, drone) in &mut self.drones {
                mixed += drone.next_sample();
            }
            *sample = mixed * gain;
            self.clock += 1;
        }

        // Reap voices whose release ramp has completed
        self.voices.retain(|v| !v.is_finished());

        self.shared_clock.store(
            (self.clock as f64 / self.sample_rate as f64).to_bits(),
            Ordering::Release,
        );

        if let Some(at) = self.completion_at {
            if self.clock >= at {
                self.completion_at = None;
                let _ = self.event_tx.send(SynthEvent::PlaybackFinished);
            }
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(cmd) = self.command_rx.try_recv() {
            match cmd {
                SynthCommand::VoiceOn {
                    id,
                    frequency,
                    waveform,
                    start_at,
                    release_at,
                } => {
                    self.voices.push(Voice::new(
                        id,
                        frequency,
                        waveform,
                        self.sample_rate,
                        self.secs_to_sample(start_at),
                        release_at.map(|secs| self.secs_to_sample(secs)),
                    ));
                }
                SynthCommand::VoiceRelease { id } => {
                    if let Some(voice) = self.voices.iter_mut().find(|v| v.id() == id) {
                        voice.release();
                    }
                }
                SynthCommand::DroneOn { id, frequency } => {
                    self.drones.push((
                        id,
                        Oscillator::new(frequency, Waveform::Sine, self.sample_rate),
                    ));
                }
                SynthCommand::DroneOff { id } => {
                    self.drones.retain(|(drone_id, _)| *drone_id != id);
                }
                SynthCommand::ArmCompletion { at } => {
                    self.completion_at = Some(self.secs_to_sample(at));
                }
            }
        }
    }
}

//! A single sounding note: one oscillator bound to one amplitude ramp.

use super::envelope::RampEnvelope;
use super::oscillator::Oscillator;
use crate::types::Waveform;

/// One currently-sounding or scheduled note on the render path.
///
/// Live voices start at the sample the note-on command is drained and are
/// released by an explicit command. Playback voices carry a future start
/// sample and a pre-scheduled release sample so their timing is exact
/// regardless of callback block boundaries.
pub struct Voice {
    id: u64,
    osc: Oscillator,
    env: RampEnvelope,
    start_at: u64,
    release_at: Option<u64>,
}

impl Voice {
    pub fn new(
        id: u64,
        frequency: f32,
        waveform: Waveform,
        sample_rate: f32,
        start_at: u64,
        release_at: Option<u64>,
    ) -> Self {
        Self {
            id,
            osc: Oscillator::new(frequency, waveform, sample_rate),
            env: RampEnvelope::new(sample_rate),
            start_at,
            release_at,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Begin the release ramp now. Drops any pending scheduled release;
    /// the manual stop wins over automation that has not run yet.
    pub fn release(&mut self) {
        self.release_at = None;
        self.env.release();
    }

    /// Check if the release ramp has completed and the voice can be dropped
    pub fn is_finished(&self) -> bool {
        self.env.is_finished()
    }

    /// Render one sample at the given engine clock position.
    ///
    /// Silent (and frozen) before the scheduled start sample.
    pub fn sample_at(&mut self, clock: u64) -> f32 {
        if clock < self.start_at {
            return 0.0;
        }
        if let Some(release_at) = self.release_at {
            if clock >= release_at {
                self.release_at = None;
                self.env.release();
            }
        }
        self.osc.next_sample() * self.env.next_sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44100.0;

    #[test]
    fn test_silent_before_scheduled_start() {
        let mut voice = Voice::new(1, 440.0, Waveform::Saw, SAMPLE_RATE, 100, None);
        for clock in 0..100 {
            assert_eq!(voice.sample_at(clock), 0.0);
        }
        // After the start sample the attack ramp begins producing output
        let mut heard = false;
        for clock in 100..600 {
            if voice.sample_at(clock).abs() > 0.01 {
                heard = true;
                break;
            }
        }
        assert!(heard, "Voice should become audible after its start sample");
    }

    #[test]
    fn test_scheduled_release_fades_out() {
        let release_at = 2000;
        let mut voice = Voice::new(1, 440.0, Waveform::Square, SAMPLE_RATE, 0, Some(release_at));
        let mut clock = 0;
        while clock < release_at {
            voice.sample_at(clock);
            clock += 1;
        }
        assert!(!voice.is_finished());
        // Two release times is more than enough to fade to the floor
        for _ in 0..(SAMPLE_RATE * 0.1) as u64 {
            voice.sample_at(clock);
            clock += 1;
        }
        assert!(voice.is_finished());
    }

    #[test]
    fn test_manual_release_cancels_scheduled() {
        let mut voice = Voice::new(1, 440.0, Waveform::Sine, SAMPLE_RATE, 0, Some(1_000_000));
        for clock in 0..1000 {
            voice.sample_at(clock);
        }
        voice.release();
        let mut clock = 1000;
        for _ in 0..(SAMPLE_RATE * 0.1) as u64 {
            voice.sample_at(clock);
            clock += 1;
        }
        assert!(
            voice.is_finished(),
            "Manual release should fade out long before the scheduled release"
        );
    }
}

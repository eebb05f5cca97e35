//! Phase-accumulator oscillator with multiple waveform support.

use crate::types::Waveform;
use std::f32::consts::PI;

/// Raw periodic waveform generator for a single frequency.
///
/// Carries no envelope; `Voice` composes one of these with an amplitude
/// ramp, while drones use one directly at constant amplitude.
pub struct Oscillator {
    frequency: f32,
    phase: f32,
    sample_rate: f32,
    waveform: Waveform,
}

impl Oscillator {
    pub fn new(frequency: f32, waveform: Waveform, sample_rate: f32) -> Self {
        Self {
            frequency,
            phase: 0.0,
            sample_rate,
            waveform,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Generate the next sample and advance the phase
    pub fn next_sample(&mut self) -> f32 {
        let value = self.generate_waveform();

        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        value
    }

    /// Generate raw waveform value based on current phase (0.0 to 1.0)
    fn generate_waveform(&self) -> f32 {
        match self.waveform {
            Waveform::Sine => self.sine(),
            Waveform::Saw => self.saw(),
            Waveform::Square => self.square(),
            Waveform::Triangle => self.triangle(),
        }
    }

    /// Sine wave: smooth, pure tone
    #[inline]
    fn sine(&self) -> f32 {
        (2.0 * PI * self.phase).sin()
    }

    /// Sawtooth wave: bright, buzzy - ramps from -1 to 1, then resets
    #[inline]
    fn saw(&self) -> f32 {
        2.0 * self.phase - 1.0
    }

    /// Square wave: hollow, woody - alternates between -1 and 1
    #[inline]
    fn square(&self) -> f32 {
        if self.phase < 0.5 { 1.0 } else { -1.0 }
    }

    /// Triangle wave: mellow, flute-like - linear ramp up then down
    #[inline]
    fn triangle(&self) -> f32 {
        if self.phase < 0.5 {
            4.0 * self.phase - 1.0
        } else {
            3.0 - 4.0 * self.phase
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44100.0;

    fn assert_in_range(waveform: Waveform) {
        let mut osc = Oscillator::new(440.0, waveform, SAMPLE_RATE);
        for _ in 0..1000 {
            let sample = osc.next_sample();
            assert!(
                (-1.0..=1.0).contains(&sample),
                "{} out of range: {}",
                waveform.name(),
                sample
            );
        }
    }

    #[test]
    fn test_sine_range() {
        assert_in_range(Waveform::Sine);
    }

    #[test]
    fn test_saw_range() {
        assert_in_range(Waveform::Saw);
    }

    #[test]
    fn test_square_range() {
        assert_in_range(Waveform::Square);
    }

    #[test]
    fn test_triangle_range() {
        assert_in_range(Waveform::Triangle);
    }

    #[test]
    fn test_sine_starts_at_zero_phase() {
        let mut osc = Oscillator::new(440.0, Waveform::Sine, SAMPLE_RATE);
        let first = osc.next_sample();
        assert!(first.abs() < 1e-6, "First sine sample should be 0, got {}", first);
    }

    #[test]
    fn test_phase_wraps() {
        // One full period of a 441Hz tone at 44100Hz is exactly 100 samples
        let mut osc = Oscillator::new(441.0, Waveform::Saw, SAMPLE_RATE);
        let first = osc.next_sample();
        for _ in 0..99 {
            osc.next_sample();
        }
        let wrapped = osc.next_sample();
        assert!(
            (first - wrapped).abs() < 1e-3,
            "Saw should repeat after one period: {} vs {}",
            first,
            wrapped
        );
    }
}

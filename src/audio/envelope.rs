//! Attack/release amplitude ramps.
//!
//! Every voice fades in from a near-silent floor and fades out back to it;
//! starting or stopping a waveform at full amplitude produces an audible
//! click from the discontinuity.

/// Time to ramp from the silence floor to full amplitude at note start.
pub const ATTACK_SECS: f32 = 0.010;

/// Time to ramp from the current level back to the silence floor at note stop.
pub const RELEASE_SECS: f32 = 0.050;

/// Near-silent floor the ramps start from and end at. Not exactly zero:
/// exponential ramps never reach zero, and the floor is inaudible.
pub const SILENCE_FLOOR: f32 = 0.001;

/// Envelope stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStage {
    /// Rising from the silence floor to peak (1.0)
    Attack,
    /// Holding at peak while the note is held
    Hold,
    /// Falling from current level back to the silence floor after note-off
    Release,
    /// Released and faded out; output is 0
    Done,
}

/// Per-sample attack/hold/release envelope generator.
///
/// Uses exponential curves for natural-sounding amplitude changes.
/// Sample-rate independent - ramp times are fixed in seconds.
pub struct RampEnvelope {
    stage: RampStage,
    level: f32,

    // Pre-computed coefficients for exponential curves
    attack_coeff: f32,
    release_coeff: f32,
}

impl RampEnvelope {
    /// Create a new envelope, already triggered into its attack phase.
    pub fn new(sample_rate: f32) -> Self {
        // Exponential envelope formula: level = level + (target - level) * coeff
        // To reach ~99.9% of target in `time` seconds:
        // coeff = 1 - exp(-6.9 / (time * sample_rate))
        // Using -6.9 because exp(-6.9) ≈ 0.001 (reaches 99.9% of target)
        let time_constant = 6.9;
        let coeff = |secs: f32| 1.0 - (-time_constant / (secs * sample_rate)).exp();

        Self {
            stage: RampStage::Attack,
            level: SILENCE_FLOOR,
            attack_coeff: coeff(ATTACK_SECS),
            release_coeff: coeff(RELEASE_SECS),
        }
    }

    /// Begin the release ramp. Cancels the attack if it has not completed;
    /// the ramp falls from whatever level the envelope is currently at.
    pub fn release(&mut self) {
        if self.stage != RampStage::Done {
            self.stage = RampStage::Release;
        }
    }

    pub fn stage(&self) -> RampStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Check if the envelope has released and faded back to the floor
    pub fn is_finished(&self) -> bool {
        self.stage == RampStage::Done
    }

    /// Generate the next amplitude sample, between 0.0 and 1.0
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            RampStage::Attack => {
                self.level += (1.0 - self.level) * self.attack_coeff;
                if self.level >= 0.999 {
                    self.level = 1.0;
                    self.stage = RampStage::Hold;
                }
            }

            RampStage::Hold => {
                self.level = 1.0;
                // Stay here until release() is called
            }

            RampStage::Release => {
                self.level += (0.0 - self.level) * self.release_coeff;
                if self.level <= SILENCE_FLOOR {
                    self.level = 0.0;
                    self.stage = RampStage::Done;
                }
            }

            RampStage::Done => {
                self.level = 0.0;
            }
        }

        self.level
    }
}

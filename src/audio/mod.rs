//! Render-path DSP: oscillators, amplitude ramps, voices, the synthesis
//! core, and the output backends that drive it.

pub mod envelope;
pub mod oscillator;
pub mod output;
pub mod synth;
pub mod voice;

pub use envelope::{RampEnvelope, ATTACK_SECS, RELEASE_SECS, SILENCE_FLOOR};
pub use oscillator::Oscillator;
pub use output::{OfflineRenderer, OutputStream};
pub use synth::{SynthCommand, SynthCore, SynthEvent};
pub use voice::Voice;

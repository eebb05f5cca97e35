/// Available oscillator waveform shapes.
///
/// The waveform is a global synthesis parameter: changing it affects only
/// voices started after the change, never voices already sounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    /// Parse waveform from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Waveform> {
        match s.to_lowercase().as_str() {
            "sine" | "sin" => Some(Waveform::Sine),
            "saw" | "sawtooth" => Some(Waveform::Saw),
            "square" | "sq" => Some(Waveform::Square),
            "triangle" | "tri" => Some(Waveform::Triangle),
            _ => None,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
        }
    }
}

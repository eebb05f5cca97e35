//! Note identifiers and note-name parsing.
//!
//! The engine treats note ids as opaque keys; only the interactive driver
//! needs to turn a name like "C4" into a frequency.

use anyhow::{anyhow, Result};
use std::fmt;

/// Opaque identifier for a pitch class + octave, e.g. "C4" or "F#3".
///
/// Unique key into the voice and drone registries. The engine never
/// interprets the contents; any non-empty string is a valid id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        NoteId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        NoteId(s.to_string())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Standard 12-tone equal temperament frequencies for the 4th octave (C4-B4)
/// Based on A4 = 440Hz standard tuning
const BASE_OCTAVE_FREQUENCIES: [f32; 12] = [
    261.63, // C4
    277.18, // C#4/Db4
    293.66, // D4
    311.13, // D#4/Eb4
    329.63, // E4
    349.23, // F4
    369.99, // F#4/Gb4
    392.00, // G4
    415.30, // G#4/Ab4
    440.00, // A4
    466.16, // A#4/Bb4
    493.88, // B4
];

/// Get the frequency in Hz for a note name like "C4", "F#3" or "Bb2".
///
/// Octaves outside the 4th are derived by doubling/halving the base octave.
pub fn note_frequency(name: &str) -> Result<f32> {
    let mut chars = name.chars();
    let letter = chars
        .next()
        .ok_or_else(|| anyhow!("Empty note name"))?
        .to_ascii_uppercase();

    let mut pitch_class: i16 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(anyhow!("Invalid note letter: {}", letter)),
    };

    let rest: String = chars.collect();
    let octave_str = match rest.chars().next() {
        Some('#') => {
            pitch_class += 1;
            &rest[1..]
        }
        Some('b') => {
            pitch_class -= 1;
            &rest[1..]
        }
        _ => &rest[..],
    };
    let pitch_class = pitch_class.rem_euclid(12) as usize;
    // Cb wraps to B of the same notated octave; close enough for a keyboard map
    let octave: i32 = octave_str
        .parse()
        .map_err(|_| anyhow!("Invalid octave in note name: {}", name))?;

    let base = BASE_OCTAVE_FREQUENCIES[pitch_class];
    Ok(base * 2.0_f32.powi(octave - 4))
}

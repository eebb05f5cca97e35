//! Pure data types shared by the control and render paths.

pub mod note;
pub mod waveform;

pub use note::{note_frequency, NoteId};
pub use waveform::Waveform;

//! Performance capture: a timestamped note-event log.
//!
//! All timestamps are engine-clock seconds relative to the recording epoch.
//! The log is ordered by note-on issuance; note-off order does not reorder
//! it. The facade gates mutation by status - this type only holds the log
//! and the epoch.

use crate::types::NoteId;

/// One captured note. `duration` is `None` while the note is still held
/// (the open sentinel) and is closed exactly once: at the matching
/// note-off, or when the recording stops.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub note: NoteId,
    pub frequency: f32,
    /// Seconds since the recording epoch
    pub start_offset: f64,
    /// Seconds the note was held; `None` while still sounding
    pub duration: Option<f64>,
}

impl RecordedEvent {
    pub fn is_open(&self) -> bool {
        self.duration.is_none()
    }
}

#[derive(Debug, Default)]
pub struct Recorder {
    epoch: f64,
    events: Vec<RecordedEvent>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new recording: discard the previous log and capture the epoch
    pub fn start(&mut self, now: f64) {
        self.events.clear();
        self.epoch = now;
    }

    /// Append an open event for a note-on
    pub fn capture_note_on(&mut self, note: &NoteId, frequency: f32, now: f64) {
        self.events.push(RecordedEvent {
            note: note.clone(),
            frequency,
            start_offset: now - self.epoch,
            duration: None,
        });
    }

    /// Close the earliest open event for this note, if any.
    ///
    /// With the at-most-one-voice invariant there is never more than one
    /// open event per note; if that invariant were ever bypassed, closing
    /// the earliest unclosed one is the chosen policy.
    pub fn capture_note_off(&mut self, note: &NoteId, now: f64) {
        let end_offset = now - self.epoch;
        if let Some(event) = self
            .events
            .iter_mut()
            .find(|e| e.note == *note && e.is_open())
        {
            event.duration = Some(end_offset - event.start_offset);
        }
    }

    /// Close every still-open event at the stop clock. Covers notes held
    /// past the end of the recording or never released at all.
    pub fn finish(&mut self, now: f64) {
        let end_offset = now - self.epoch;
        for event in self.events.iter_mut().filter(|e| e.is_open()) {
            event.duration = Some(end_offset - event.start_offset);
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_events_ordered_by_note_on() {
        let mut rec = Recorder::new();
        rec.start(10.0);
        rec.capture_note_on(&NoteId::from("A4"), 440.0, 10.0);
        rec.capture_note_on(&NoteId::from("B4"), 493.88, 10.1);
        rec.capture_note_off(&NoteId::from("A4"), 10.3);
        rec.capture_note_off(&NoteId::from("B4"), 10.6);

        let events = rec.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].note, NoteId::from("A4"));
        assert_eq!(events[1].note, NoteId::from("B4"));
        assert!((events[0].start_offset - 0.0).abs() < TOLERANCE);
        assert!((events[0].duration.unwrap() - 0.3).abs() < TOLERANCE);
        assert!((events[1].start_offset - 0.1).abs() < TOLERANCE);
        assert!((events[1].duration.unwrap() - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_note_off_without_open_event_is_ignored() {
        let mut rec = Recorder::new();
        rec.start(0.0);
        rec.capture_note_off(&NoteId::from("C4"), 1.0);
        assert!(rec.is_empty());
    }

    #[test]
    fn test_finish_closes_held_notes() {
        let mut rec = Recorder::new();
        rec.start(5.0);
        rec.capture_note_on(&NoteId::from("C4"), 261.63, 5.2);
        rec.finish(5.9);
        let event = &rec.events()[0];
        assert!((event.duration.unwrap() - 0.7).abs() < TOLERANCE);
        assert!(event.duration.unwrap() > 0.0);
    }

    #[test]
    fn test_close_earliest_open_for_duplicate_notes() {
        // Only reachable if the one-voice-per-note invariant is bypassed;
        // the policy is to close the earliest unclosed event first.
        let mut rec = Recorder::new();
        rec.start(0.0);
        rec.capture_note_on(&NoteId::from("C4"), 261.63, 0.0);
        rec.capture_note_on(&NoteId::from("C4"), 261.63, 0.5);
        rec.capture_note_off(&NoteId::from("C4"), 1.0);

        assert_eq!(rec.events()[0].duration, Some(1.0));
        assert!(rec.events()[1].is_open());
    }

    #[test]
    fn test_start_discards_previous_log() {
        let mut rec = Recorder::new();
        rec.start(0.0);
        rec.capture_note_on(&NoteId::from("C4"), 261.63, 0.1);
        rec.finish(0.2);
        assert!(!rec.is_empty());

        rec.start(1.0);
        assert!(rec.is_empty());
    }
}

//! Playback scheduling: turns a recording log into timed voice commands.
//!
//! Every closed event becomes one freshly-created voice with an absolute
//! engine-clock start and a pre-scheduled release whose ramp to the silence
//! floor ends exactly at the event's end. The render path converts the
//! second stamps to sample indices, so playback timing is sample-accurate
//! rather than polled. Playback voices never enter the live voice registry.

use super::recorder::RecordedEvent;
use crate::audio::envelope::RELEASE_SECS;
use crate::audio::synth::SynthCommand;
use crate::types::Waveform;
use crossbeam_channel::Sender;

/// Schedule every playable event relative to `playback_start`.
///
/// Events with a non-positive or still-open duration are skipped as
/// malformed. Voices use the waveform selected at play time, not the one
/// active when the event was recorded (preserved original behavior).
///
/// Returns the absolute engine-clock time the last scheduled voice ends,
/// or `None` if nothing was schedulable.
pub fn schedule_log(
    events: &[RecordedEvent],
    playback_start: f64,
    waveform: Waveform,
    next_voice_id: &mut u64,
    command_tx: &Sender<SynthCommand>,
) -> Option<f64> {
    let mut ends_at: Option<f64> = None;

    for event in events {
        let duration = match event.duration {
            Some(d) if d > 0.0 => d,
            _ => continue,
        };

        let start_at = playback_start + event.start_offset;
        let end_at = start_at + duration;
        // The release ramp must finish at the event end; begin it one
        // release time earlier, clamped for notes shorter than the ramp.
        let release_lead = f64::from(RELEASE_SECS).min(duration);
        let release_at = end_at - release_lead;

        let id = *next_voice_id;
        *next_voice_id += 1;
        let _ = command_tx.send(SynthCommand::VoiceOn {
            id,
            frequency: event.frequency,
            waveform,
            start_at,
            release_at: Some(release_at),
        });

        ends_at = Some(ends_at.map_or(end_at, |e: f64| e.max(end_at)));
    }

    ends_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoteId;
    use crossbeam_channel::unbounded;

    fn event(note: &str, frequency: f32, start_offset: f64, duration: Option<f64>) -> RecordedEvent {
        RecordedEvent {
            note: NoteId::from(note),
            frequency,
            start_offset,
            duration,
        }
    }

    #[test]
    fn test_schedules_at_original_offsets() {
        let (tx, rx) = unbounded();
        let mut next_id = 10;
        let log = vec![
            event("C4", 261.63, 0.0, Some(0.3)),
            event("E4", 329.63, 0.5, Some(0.2)),
        ];

        let ends_at = schedule_log(&log, 100.0, Waveform::Square, &mut next_id, &tx);
        assert!((ends_at.unwrap() - 100.7).abs() < 1e-9);
        assert_eq!(next_id, 12);

        let commands: Vec<_> = rx.try_iter().collect();
        assert_eq!(commands.len(), 2);
        match &commands[0] {
            SynthCommand::VoiceOn {
                id,
                frequency,
                waveform,
                start_at,
                release_at,
            } => {
                assert_eq!(*id, 10);
                assert_eq!(*frequency, 261.63);
                // Play-time waveform, not record-time
                assert_eq!(*waveform, Waveform::Square);
                assert!((start_at - 100.0).abs() < 1e-9);
                // Release ramp ends exactly at the event end
                let release_at = release_at.unwrap();
                assert!((release_at + f64::from(RELEASE_SECS) - 100.3).abs() < 1e-9);
            }
            other => panic!("Expected VoiceOn, got {:?}", other),
        }
    }

    #[test]
    fn test_skips_malformed_events() {
        let (tx, rx) = unbounded();
        let mut next_id = 0;
        let log = vec![
            event("C4", 261.63, 0.0, Some(0.0)),
            event("D4", 293.66, 0.1, Some(-0.5)),
            event("E4", 329.63, 0.2, None),
        ];

        let ends_at = schedule_log(&log, 0.0, Waveform::Sine, &mut next_id, &tx);
        assert_eq!(ends_at, None);
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(next_id, 0);
    }

    #[test]
    fn test_short_note_release_clamped_to_start() {
        let (tx, rx) = unbounded();
        let mut next_id = 0;
        // Shorter than the release ramp itself
        let log = vec![event("C4", 261.63, 0.0, Some(0.02))];
        schedule_log(&log, 50.0, Waveform::Sine, &mut next_id, &tx);

        match rx.try_recv().unwrap() {
            SynthCommand::VoiceOn {
                start_at,
                release_at,
                ..
            } => {
                assert!(release_at.unwrap() >= start_at);
            }
            other => panic!("Expected VoiceOn, got {:?}", other),
        }
    }
}

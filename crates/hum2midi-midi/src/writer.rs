//! Standard MIDI File writer (format 0, one track, 480 PPQ).
//!
//! Layout:
//!
//! ```text
//! MThd <len=6> <format=0> <tracks=1> <division=480>
//! MTrk <len>   (<delta VLQ> <event>)*  00 FF 2F 00
//! ```

use crate::event::{sort_events, TimedEvent, TrackEvent};
use crate::vlq::{write_vlq, MAX_VLQ};
use crate::{ExportError, Result};
use hum2midi_core::NoteEvent;
use tracing::debug;

/// Ticks per quarter note written to the header.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Length field of the header chunk.
pub const HEADER_CHUNK_LEN: u32 = 6;

const HEADER_MAGIC: &[u8; 4] = b"MThd";
const TRACK_MAGIC: &[u8; 4] = b"MTrk";
const END_OF_TRACK: [u8; 4] = [0x00, 0xFF, 0x2F, 0x00];

/// Largest value that fits the 24-bit tempo field.
const MAX_MICROS_PER_QUARTER: f64 = 0xFF_FFFF as f64;

/// Microseconds per quarter note at `bpm` (floored).
pub fn micros_per_quarter(bpm: f64) -> Result<u32> {
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(ExportError::InvalidTempo(bpm));
    }
    let micros = (60_000_000.0 / bpm).floor();
    if micros < 1.0 || micros > MAX_MICROS_PER_QUARTER {
        return Err(ExportError::InvalidTempo(bpm));
    }
    Ok(micros as u32)
}

/// Ticks per second at `bpm`.
fn ticks_per_second(bpm: f64) -> f64 {
    TICKS_PER_QUARTER as f64 * bpm / 60.0
}

/// Absolute tick of a time in seconds (floored).
pub fn seconds_to_ticks(secs: f64, bpm: f64) -> f64 {
    (secs * ticks_per_second(bpm)).floor()
}

/// Build the unsorted event list: one tempo event at tick 0 followed by a
/// note-on/note-off pair per note.
///
/// Each note-off lands at least one tick after its note-on. Velocities are
/// clamped into 1-127.
pub fn build_events(notes: &[NoteEvent], bpm: f64) -> Result<Vec<TimedEvent>> {
    let micros = micros_per_quarter(bpm)?;

    let mut events = Vec::with_capacity(notes.len() * 2 + 1);
    events.push(TimedEvent::new(
        0,
        TrackEvent::Tempo {
            micros_per_quarter: micros,
        },
    ));

    for (index, note) in notes.iter().enumerate() {
        if note.midi > 127 {
            return Err(ExportError::InvalidNote {
                index,
                midi: note.midi,
            });
        }
        if !note.start.is_finite() || note.start < 0.0 || !note.duration.is_finite() {
            return Err(ExportError::InvalidTiming {
                index,
                start: note.start,
                duration: note.duration,
            });
        }

        let start_tick = seconds_to_ticks(note.start, bpm);
        let end_tick = seconds_to_ticks(note.start + note.duration, bpm).max(start_tick + 1.0);
        if end_tick > MAX_VLQ as f64 {
            return Err(ExportError::TickOverflow {
                index,
                tick: end_tick,
            });
        }

        events.push(TimedEvent::new(
            start_tick as u32,
            TrackEvent::NoteOn {
                key: note.midi,
                velocity: note.velocity.clamp(1, 127),
            },
        ));
        events.push(TimedEvent::new(
            end_tick as u32,
            TrackEvent::NoteOff { key: note.midi },
        ));
    }

    Ok(events)
}

/// Serialize sorted events into a track body, ending with end-of-track.
pub fn encode_track(events: &[TimedEvent]) -> Vec<u8> {
    let mut data = Vec::with_capacity(events.len() * 5 + END_OF_TRACK.len());
    let mut prev_tick = 0u32;
    for timed in events {
        write_vlq(&mut data, timed.tick.saturating_sub(prev_tick));
        prev_tick = timed.tick;
        timed.event.write(&mut data);
    }
    data.extend_from_slice(&END_OF_TRACK);
    data
}

/// Encode a note list as a complete single-track MIDI file.
///
/// Deterministic: the same notes and tempo always yield the same bytes.
pub fn encode(notes: &[NoteEvent], bpm: f64) -> Result<Vec<u8>> {
    let mut events = build_events(notes, bpm)?;
    sort_events(&mut events);
    let track = encode_track(&events);

    let mut out = Vec::with_capacity(14 + 8 + track.len());
    out.extend_from_slice(HEADER_MAGIC);
    out.extend_from_slice(&HEADER_CHUNK_LEN.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // format 0
    out.extend_from_slice(&1u16.to_be_bytes()); // 1 track
    out.extend_from_slice(&TICKS_PER_QUARTER.to_be_bytes());

    out.extend_from_slice(TRACK_MAGIC);
    out.extend_from_slice(&(track.len() as u32).to_be_bytes());
    out.extend_from_slice(&track);

    debug!(
        notes = notes.len(),
        events = events.len(),
        bytes = out.len(),
        "encoded MIDI file"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(start: f64, duration: f64, midi: u8) -> NoteEvent {
        NoteEvent {
            start,
            duration,
            midi,
            velocity: 96,
        }
    }

    fn track_body(file: &[u8]) -> &[u8] {
        &file[22..]
    }

    #[test]
    fn test_single_note_exact_bytes() {
        let bytes = encode(&[note(0.0, 0.5, 60)], 120.0).unwrap();

        let expected: Vec<u8> = [
            // MThd, len 6, format 0, 1 track, 480 ppq
            &b"MThd"[..],
            &[0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0],
            // MTrk, len 20
            &b"MTrk"[..],
            &[0, 0, 0, 20],
            // note-on sorts before the tempo meta at tick 0
            &[0x00, 0x90, 60, 96],
            &[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20],
            &[0x83, 0x60, 0x80, 60, 0],
            &[0x00, 0xFF, 0x2F, 0x00],
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_header_and_track_lengths() {
        let notes = [note(0.0, 0.25, 60), note(0.25, 0.5, 64), note(1.0, 2.0, 67)];
        let bytes = encode(&notes, 97.0).unwrap();

        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 6);
        assert_eq!(&bytes[14..18], b"MTrk");
        let track_len = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]);
        assert_eq!(track_len as usize, bytes.len() - 22);
        assert!(track_body(&bytes).ends_with(&[0x00, 0xFF, 0x2F, 0x00]));
    }

    #[test]
    fn test_note_off_precedes_note_on_at_shared_tick() {
        // First note ends exactly where the second begins (tick 480)
        let bytes = encode(&[note(0.0, 0.5, 60), note(0.5, 0.5, 62)], 120.0).unwrap();
        let body = track_body(&bytes);

        let off_60 = body
            .windows(3)
            .position(|w| w == [0x80, 60, 0])
            .expect("note-off for 60");
        let on_62 = body
            .windows(3)
            .position(|w| w == [0x90, 62, 96])
            .expect("note-on for 62");
        assert!(off_60 < on_62);

        // The note-on follows the note-off with a zero delta
        assert_eq!(body[on_62 - 1], 0x00);
    }

    #[test]
    fn test_deterministic() {
        let notes = [note(0.1, 0.3, 55), note(0.4, 0.2, 57), note(0.4, 0.6, 62)];
        assert_eq!(encode(&notes, 133.0).unwrap(), encode(&notes, 133.0).unwrap());
    }

    #[test]
    fn test_zero_length_note_gets_one_tick() {
        let events = build_events(&[note(1.0, 0.0, 60)], 120.0).unwrap();
        assert_eq!(events[1].tick, 960);
        assert_eq!(events[2].tick, 961);
    }

    #[test]
    fn test_ticks_are_floored() {
        // 0.3 s at 100 BPM = 240 ticks exactly; 0.301 s just above
        assert_eq!(seconds_to_ticks(0.301, 100.0), 240.0);
        assert_eq!(seconds_to_ticks(0.0, 100.0), 0.0);
        assert_eq!(seconds_to_ticks(1.0, 120.0), 960.0);
    }

    #[test]
    fn test_tempo_micros() {
        assert_eq!(micros_per_quarter(120.0), Ok(500_000));
        assert_eq!(micros_per_quarter(110.0), Ok(545_454));
        assert_eq!(micros_per_quarter(220.0), Ok(272_727));
        assert!(micros_per_quarter(0.0).is_err());
        assert!(micros_per_quarter(f64::NAN).is_err());
        // 60e6 / 3 exceeds 24 bits
        assert!(micros_per_quarter(3.0).is_err());
    }

    #[test]
    fn test_velocity_clamped() {
        let mut quiet = note(0.0, 0.5, 60);
        quiet.velocity = 0;
        let mut loud = note(1.0, 0.5, 62);
        loud.velocity = 200;

        let events = build_events(&[quiet, loud], 120.0).unwrap();
        assert_eq!(
            events[1].event,
            TrackEvent::NoteOn {
                key: 60,
                velocity: 1
            }
        );
        assert_eq!(
            events[3].event,
            TrackEvent::NoteOn {
                key: 62,
                velocity: 127
            }
        );
    }

    #[test]
    fn test_rejects_invalid_notes() {
        assert_eq!(
            encode(&[note(0.0, 0.5, 128)], 120.0),
            Err(ExportError::InvalidNote {
                index: 0,
                midi: 128
            })
        );
        assert!(matches!(
            encode(&[note(0.0, 0.5, 60), note(-1.0, 0.5, 60)], 120.0),
            Err(ExportError::InvalidTiming { index: 1, .. })
        ));
        assert!(matches!(
            encode(&[note(0.0, f64::INFINITY, 60)], 120.0),
            Err(ExportError::InvalidTiming { index: 0, .. })
        ));
        assert!(matches!(
            encode(&[note(1.0e9, 1.0, 60)], 120.0),
            Err(ExportError::TickOverflow { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_note_list() {
        let bytes = encode(&[], 120.0).unwrap();
        // tempo event + end of track
        assert_eq!(
            track_body(&bytes),
            &[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, 0x00, 0xFF, 0x2F, 0x00]
        );
    }
}

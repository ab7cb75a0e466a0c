//! # hum2midi midi
//!
//! Encodes a note list as a Standard MIDI File:
//! - Format 0, one track, 480 ticks per quarter note
//! - A tempo meta-event at tick 0, then note-on/note-off pairs on channel 1
//! - Variable-length delta times, closed by an end-of-track marker
//!
//! The encoder is a pure function of its inputs. It validates every note
//! before producing bytes.
//!
//! ## Example
//!
//! ```rust
//! use hum2midi_core::NoteEvent;
//!
//! let notes = [NoteEvent::new(0.0, 0.5, 60, 96)?];
//! let bytes = hum2midi_midi::encode(&notes, 120.0)?;
//! assert_eq!(&bytes[..4], b"MThd");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod event;
pub mod vlq;
pub mod writer;

pub use error::{ExportError, Result};
pub use event::{event_order, sort_events, TimedEvent, TrackEvent};
pub use vlq::write_vlq;
pub use writer::{
    build_events, encode, encode_track, micros_per_quarter, seconds_to_ticks, TICKS_PER_QUARTER,
};

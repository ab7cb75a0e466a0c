//! Quantized notes.

use crate::{Error, Result};

/// One note of the current composition.
///
/// Times are seconds relative to the start of the window the note list was
/// quantized from. The quantizer only produces valid events; editors that
/// mutate fields directly are responsible for keeping them valid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NoteEvent {
    /// Onset in seconds (≥ 0)
    pub start: f64,
    /// Length in seconds (> 0)
    pub duration: f64,
    /// MIDI note number (0-127)
    pub midi: u8,
    /// Note-on velocity (1-127)
    pub velocity: u8,
}

impl NoteEvent {
    /// Create a note, checking every field.
    pub fn new(start: f64, duration: f64, midi: u8, velocity: u8) -> Result<Self> {
        if !start.is_finite() || start < 0.0 {
            return Err(Error::InvalidStart(start));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(Error::InvalidDuration(duration));
        }
        if midi > 127 || velocity == 0 || velocity > 127 {
            return Err(Error::InvalidNote {
                midi: midi as i32,
                velocity: velocity as i32,
            });
        }
        Ok(Self {
            start,
            duration,
            midi,
            velocity,
        })
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Note name with sharps, e.g. "C#4".
    pub fn name(&self) -> String {
        crate::note_name(self.midi as i32)
    }

    /// Whether the note sounds at any point inside `[start, end)`.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && self.end() > start
    }
}

//! The current composition: the note list a user edits, plays and exports.

use crate::quantize::{quantize, QuantizeParams};
use crate::{Result, TranscribeError};
use hum2midi_core::{clamp_bpm, NoteEvent, PitchFrame, DEFAULT_BPM};

/// Shortest duration a resize can leave a note with, in seconds.
pub const MIN_EDIT_DURATION: f64 = 0.05;

/// Note list plus the tempo it was quantized at.
///
/// A successful quantization replaces the whole list; a failed one leaves the
/// previous list untouched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Composition {
    notes: Vec<NoteEvent>,
    bpm: f64,
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}

impl Composition {
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            bpm: DEFAULT_BPM,
        }
    }

    pub fn from_notes(notes: Vec<NoteEvent>, bpm: f64) -> Self {
        Self {
            notes,
            bpm: clamp_bpm(bpm),
        }
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    /// Tempo of the last successful quantization.
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// End of the last-sounding note, in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.notes.iter().map(NoteEvent::end).fold(0.0, f64::max)
    }

    /// Replace every note at once.
    pub fn replace(&mut self, notes: Vec<NoteEvent>, bpm: f64) {
        self.notes = notes;
        self.bpm = clamp_bpm(bpm);
    }

    /// Re-quantize from raw trace frames, replacing the note list on success.
    pub fn quantize_from(
        &mut self,
        frames: &[PitchFrame],
        params: &QuantizeParams,
    ) -> Result<&[NoteEvent]> {
        let notes = quantize(frames, params)?;
        self.replace(notes, params.effective_bpm());
        Ok(&self.notes)
    }

    /// Shift every note by `semitones`, clamping into `[floor, ceiling]`.
    pub fn transpose(&mut self, semitones: i32, floor: u8, ceiling: u8) {
        for note in &mut self.notes {
            note.midi = (note.midi as i32 + semitones).clamp(floor as i32, ceiling as i32) as u8;
        }
    }

    /// Move one note in time and pitch.
    ///
    /// The start is clamped to be non-negative and the pitch into
    /// `[floor, ceiling]`.
    pub fn move_note(
        &mut self,
        index: usize,
        start: f64,
        midi: i32,
        floor: u8,
        ceiling: u8,
    ) -> Result<()> {
        let note = self.note_mut(index)?;
        note.start = if start.is_finite() { start.max(0.0) } else { 0.0 };
        note.midi = midi.clamp(floor as i32, ceiling as i32) as u8;
        Ok(())
    }

    /// Change one note's duration (never below [`MIN_EDIT_DURATION`]).
    pub fn resize_note(&mut self, index: usize, duration: f64) -> Result<()> {
        let note = self.note_mut(index)?;
        note.duration = if duration.is_finite() {
            duration.max(MIN_EDIT_DURATION)
        } else {
            MIN_EDIT_DURATION
        };
        Ok(())
    }

    /// Notes sounding inside `[start, end)`, clipped to the window and
    /// rebased so the window starts at zero.
    pub fn window(&self, start: f64, end: f64) -> Result<Vec<NoteEvent>> {
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(TranscribeError::InvalidWindow { start, end });
        }
        Ok(self
            .notes
            .iter()
            .filter(|n| n.overlaps(start, end))
            .map(|n| {
                let clipped_start = n.start.max(start);
                let clipped_end = n.end().min(end);
                NoteEvent {
                    start: clipped_start - start,
                    duration: clipped_end - clipped_start,
                    ..*n
                }
            })
            .collect())
    }

    fn note_mut(&mut self, index: usize) -> Result<&mut NoteEvent> {
        let len = self.notes.len();
        self.notes
            .get_mut(index)
            .ok_or(TranscribeError::NoteIndex { index, len })
    }
}

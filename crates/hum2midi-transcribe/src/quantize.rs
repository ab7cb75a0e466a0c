//! Pitch-trace quantization.
//!
//! A window of the trace is cut into sixteenth-note buckets at the given
//! tempo. Each bucket takes the median MIDI value of the in-range frames that
//! fall inside it (or silence when there are none), and runs of equal buckets
//! merge into notes.

use crate::{Result, TranscribeError};
use hum2midi_core::{
    clamp_bpm, grid_step_secs, round_half_up, NoteEvent, PitchFrame, DEFAULT_BPM,
    DEFAULT_PITCH_CEILING, DEFAULT_PITCH_FLOOR, DEFAULT_VELOCITY,
};
use std::iter;
use tracing::debug;

/// Window, tempo and pitch range for one quantization pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct QuantizeParams {
    /// Window start in trace seconds.
    pub start: f64,
    /// Window end in trace seconds (exclusive for bucketing).
    pub end: f64,
    /// Tempo in BPM; clamped to 40-220 when used.
    pub bpm: f64,
    /// Lowest MIDI note kept.
    pub pitch_floor: u8,
    /// Highest MIDI note kept.
    pub pitch_ceiling: u8,
}

impl Default for QuantizeParams {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 0.0,
            bpm: DEFAULT_BPM,
            pitch_floor: DEFAULT_PITCH_FLOOR,
            pitch_ceiling: DEFAULT_PITCH_CEILING,
        }
    }
}

impl QuantizeParams {
    /// Window and tempo with the default pitch range.
    pub fn new(start: f64, end: f64, bpm: f64) -> Self {
        Self {
            start,
            end,
            bpm,
            ..Default::default()
        }
    }

    pub fn with_pitch_range(mut self, floor: u8, ceiling: u8) -> Self {
        self.pitch_floor = floor;
        self.pitch_ceiling = ceiling;
        self
    }

    /// Tempo actually used for the grid.
    pub fn effective_bpm(&self) -> f64 {
        clamp_bpm(self.bpm)
    }

    /// Grid step (one sixteenth note) in seconds.
    pub fn step_secs(&self) -> f64 {
        grid_step_secs(self.effective_bpm())
    }

    /// Number of grid buckets covering the window (at least one).
    ///
    /// [`bucketize`] never emits buckets past the last usable frame, so its
    /// output may be shorter.
    pub fn bucket_count(&self) -> usize {
        let total = self.end - self.start;
        ((total / self.step_secs()).ceil() as usize).max(1)
    }

    fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() || self.end <= self.start {
            return Err(TranscribeError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        if self.pitch_floor > self.pitch_ceiling || self.pitch_ceiling > 127 {
            return Err(TranscribeError::InvalidPitchRange {
                floor: self.pitch_floor,
                ceiling: self.pitch_ceiling,
            });
        }
        Ok(())
    }
}

/// Quantized content of one grid step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Silence,
    Pitch(u8),
}

/// Quantize the frames inside `params`' window into notes.
///
/// Frames may be a full trace or a pre-filtered snapshot; only frames with
/// `start <= t <= end` and a MIDI value inside the pitch range are used.
/// Note starts are relative to the window start.
pub fn quantize(frames: &[PitchFrame], params: &QuantizeParams) -> Result<Vec<NoteEvent>> {
    let buckets = bucketize(frames, params)?;
    let notes = merge_runs(&buckets, params.step_secs());

    debug!(
        buckets = buckets.len(),
        notes = notes.len(),
        bpm = params.effective_bpm(),
        "quantized pitch trace"
    );
    Ok(notes)
}

/// Assign every grid bucket of the window, up to the one holding the last
/// usable frame, its median pitch or silence.
pub fn bucketize(frames: &[PitchFrame], params: &QuantizeParams) -> Result<Vec<Bucket>> {
    params.validate()?;

    let usable: Vec<&PitchFrame> = frames
        .iter()
        .filter(|f| f.t >= params.start && f.t <= params.end)
        .filter(|f| f.in_pitch_range(params.pitch_floor, params.pitch_ceiling))
        .collect();

    if usable.is_empty() {
        return Err(TranscribeError::NoDataInWindow {
            start: params.start,
            end: params.end,
        });
    }

    let step = params.step_secs();
    let mut values: Vec<i32> = Vec::new();

    // Every bucket after the last usable frame is silence
    let last_t = usable.iter().map(|f| f.t).fold(params.start, f64::max);
    let occupied = ((last_t - params.start) / step).floor() as usize + 1;
    let count = params.bucket_count().min(occupied);

    let buckets = (0..count)
        .map(|i| {
            let t0 = params.start + i as f64 * step;
            let t1 = t0 + step;

            values.clear();
            values.extend(
                usable
                    .iter()
                    .filter(|f| f.t >= t0 && f.t < t1)
                    .map(|f| f.midi),
            );

            match median(&mut values) {
                // In range by construction, so it fits a u8
                Some(midi) => Bucket::Pitch(midi as u8),
                None => Bucket::Silence,
            }
        })
        .collect();

    Ok(buckets)
}

/// Median of integer values; an even count averages the middle pair and
/// rounds half up.
fn median(values: &mut [i32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        let avg = (values[mid - 1] as f64 + values[mid] as f64) / 2.0;
        Some(round_half_up(avg) as i32)
    } else {
        Some(values[mid])
    }
}

/// Run-length encode buckets into notes.
fn merge_runs(buckets: &[Bucket], step: f64) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    let mut run_start = 0usize;
    let mut current = Bucket::Silence;

    // Trailing silence closes the final run
    for (i, &bucket) in buckets.iter().chain(iter::once(&Bucket::Silence)).enumerate() {
        if bucket == current {
            continue;
        }
        if let Bucket::Pitch(midi) = current {
            let steps = i - run_start;
            notes.push(NoteEvent {
                start: run_start as f64 * step,
                duration: (steps as f64 * step).max(step),
                midi,
                velocity: DEFAULT_VELOCITY,
            });
        }
        current = bucket;
        run_start = i;
    }

    notes
}

//! Pitch and tempo arithmetic.
//!
//! MIDI note = 69 + 12 · log2(f / 440), rounded to the nearest semitone.
//! Rounding is half-up everywhere (x.5 → x+1) so results do not depend on
//! the platform's tie-breaking mode.

use crate::{DEFAULT_BPM, MAX_BPM, MIN_BPM};

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Round to the nearest integer, ties toward positive infinity.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Nearest-semitone MIDI number for a frequency in Hz.
///
/// Non-positive frequencies map to `i32::MIN` so that they fall outside any
/// pitch range.
pub fn hz_to_midi(freq: f64) -> i32 {
    if freq <= 0.0 || !freq.is_finite() {
        return i32::MIN;
    }
    round_half_up(69.0 + 12.0 * (freq / 440.0).log2()) as i32
}

/// Frequency in Hz of a MIDI note number.
pub fn midi_to_hz(midi: i32) -> f64 {
    440.0 * 2.0f64.powf((midi as f64 - 69.0) / 12.0)
}

/// Deviation of `freq` from its nearest semitone, in cents (-50 to +50).
pub fn cents_offset(freq: f64) -> f64 {
    if freq <= 0.0 || !freq.is_finite() {
        return 0.0;
    }
    let note_freq = midi_to_hz(hz_to_midi(freq));
    1200.0 * (freq / note_freq).log2()
}

/// Note name with sharp notation (e.g. "A4", "C#5").
pub fn note_name(midi: i32) -> String {
    format!(
        "{}{}",
        SHARP_NAMES[midi.rem_euclid(12) as usize],
        midi.div_euclid(12) - 1
    )
}

/// Note name with flat notation (e.g. "A4", "Db5").
pub fn note_name_flat(midi: i32) -> String {
    format!(
        "{}{}",
        FLAT_NAMES[midi.rem_euclid(12) as usize],
        midi.div_euclid(12) - 1
    )
}

/// Clamp a tempo into the supported range. Non-finite or non-positive input
/// falls back to the default tempo.
pub fn clamp_bpm(bpm: f64) -> f64 {
    if !bpm.is_finite() || bpm <= 0.0 {
        return DEFAULT_BPM;
    }
    bpm.clamp(MIN_BPM, MAX_BPM)
}

/// Length of one sixteenth note at `bpm`, in seconds.
pub fn grid_step_secs(bpm: f64) -> f64 {
    60.0 / bpm / 4.0
}

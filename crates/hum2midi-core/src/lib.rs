//! # hum2midi core
//!
//! Data shared by every hum2midi subsystem:
//! - **PitchFrame**: one timestamped pitch estimate from the capture loop
//! - **NoteEvent**: one quantized note in seconds, relative to a window start
//! - **Pitch math**: Hz ↔ MIDI conversion, note names, tempo clamping
//!
//! Nothing here allocates on the audio path or performs I/O.

pub mod error;
pub mod frame;
pub mod note;
pub mod pitch_math;

pub use error::{Error, Result};
pub use frame::PitchFrame;
pub use note::NoteEvent;
pub use pitch_math::{
    cents_offset, clamp_bpm, grid_step_secs, hz_to_midi, midi_to_hz, note_name, note_name_flat,
    round_half_up,
};

/// Default tempo when the caller supplies none (or a non-finite one).
pub const DEFAULT_BPM: f64 = 110.0;

/// Slowest tempo accepted by quantization and export.
pub const MIN_BPM: f64 = 40.0;

/// Fastest tempo accepted by quantization and export.
pub const MAX_BPM: f64 = 220.0;

/// Default lowest MIDI note kept by the quantizer (C2).
pub const DEFAULT_PITCH_FLOOR: u8 = 36;

/// Default highest MIDI note kept by the quantizer (C6).
pub const DEFAULT_PITCH_CEILING: u8 = 84;

/// Velocity given to every generated note.
pub const DEFAULT_VELOCITY: u8 = 96;

//! # hum2midi - Hum-to-MIDI transcription
//!
//! Turns a monophonic vocal recording into a single-track Standard MIDI File.
//!
//! ## Architecture
//!
//! hum2midi is an umbrella crate that coordinates:
//! - **hum2midi-core** - Shared data model (pitch frames, notes, pitch math)
//! - **hum2midi-analysis** - Pitch estimation, the pitch trace, live capture
//! - **hum2midi-transcribe** - Grid quantization and the editable composition
//! - **hum2midi-midi** - Standard MIDI File encoding
//!
//! ## Quick Start
//!
//! ```rust
//! use hum2midi::prelude::*;
//!
//! let mut session = Session::builder().bpm(120.0).build()?;
//!
//! // Feed audio while recording (from a device callback, a file, ...)
//! session.start_recording();
//! let hum: Vec<f32> = (0..44100)
//!     .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin() * 0.4)
//!     .collect();
//! session.process_samples(&hum);
//! session.stop_recording();
//!
//! // Quantize the trimmed window, edit, export
//! session.set_trim_end(0.5);
//! session.convert()?;
//! session.octave_up();
//! let smf = session.export_midi()?;
//! assert_eq!(&smf[..4], b"MThd");
//! # Ok::<(), hum2midi::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `live` - Background capture thread fed by a ring buffer
//! - `wav` - WAV file input
//! - `cli` - The `hum2midi` binary
//! - `serialization` - serde support for the data model

pub mod builder;
pub mod config;
pub mod error;
#[cfg(feature = "wav")]
pub mod file;
pub mod session;
pub mod trim;
#[cfg(feature = "wav")]
pub mod wav;

/// Re-export of hum2midi-core for direct access
pub use hum2midi_core as core;

/// Pitch estimation and capture
pub use hum2midi_analysis as analysis;

/// Quantization and note editing
pub use hum2midi_transcribe as transcribe;

/// MIDI file encoding
pub use hum2midi_midi as midi;

pub use builder::SessionBuilder;
pub use config::SessionConfig;
pub use error::{Error, Result};
#[cfg(feature = "wav")]
pub use file::{transcribe_file, FileOptions};
pub use session::{Session, DEFAULT_EXPORT_FILENAME};
pub use trim::TrimRange;
#[cfg(feature = "wav")]
pub use wav::{read_wav_mono, MonoAudio};

pub use hum2midi_analysis::{CorrelationMethod, PitchResult, PitchTrace};
pub use hum2midi_core::{NoteEvent, PitchFrame};
pub use hum2midi_transcribe::{Composition, QuantizeParams};

/// Common imports
pub mod prelude {
    pub use crate::{
        Composition, CorrelationMethod, Error, NoteEvent, PitchFrame, PitchResult, Result,
        Session, SessionBuilder, SessionConfig, TrimRange,
    };
    pub use hum2midi_core::{hz_to_midi, midi_to_hz, note_name};
}

//! # hum2midi transcribe
//!
//! Collapses a dense pitch trace into a sparse note list:
//! - **Grid bucketing**: sixteenth-note buckets at the chosen tempo
//! - **Median filtering**: one pitch (or silence) per bucket
//! - **Run-length merging**: equal consecutive buckets become one note
//!
//! [`Composition`] owns the resulting list and the editing operations that
//! apply to it (transpose, move, resize, re-windowing).
//!
//! ## Example
//!
//! ```rust
//! use hum2midi_core::PitchFrame;
//! use hum2midi_transcribe::{quantize, QuantizeParams};
//!
//! let frames: Vec<PitchFrame> = (0..50)
//!     .map(|i| PitchFrame::from_frequency(i as f64 * 0.01, 261.63))
//!     .collect();
//!
//! let notes = quantize(&frames, &QuantizeParams::new(0.0, 0.5, 120.0))?;
//! assert_eq!(notes.len(), 1);
//! assert_eq!(notes[0].midi, 60);
//! # Ok::<(), hum2midi_transcribe::TranscribeError>(())
//! ```

pub mod composition;
pub mod error;
pub mod quantize;

pub use composition::{Composition, MIN_EDIT_DURATION};
pub use error::{Result, TranscribeError};
pub use quantize::{bucketize, quantize, Bucket, QuantizeParams};

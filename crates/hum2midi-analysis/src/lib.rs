//! # hum2midi analysis
//!
//! Turns a stream of audio blocks into a pitch trace:
//! - **Pitch estimation**: trimmed autocorrelation with parabolic refinement
//! - **Pitch trace**: pre-sized, single-writer frame buffer with snapshot reads
//! - **Live capture**: background thread fed by a lock-free ring buffer
//! - **Offline analysis**: the same path over a whole buffer
//!
//! All estimation operates on raw `&[f32]` blocks - no audio framework
//! dependencies.
//!
//! ## Example
//!
//! ```rust
//! use hum2midi_analysis::PitchEstimator;
//!
//! let sample_rate = 44100.0;
//! let block: Vec<f32> = (0..2048)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin() * 0.5)
//!     .collect();
//!
//! let mut estimator = PitchEstimator::new(sample_rate);
//! let pitch = estimator.detect(&block);
//! assert_eq!(pitch.midi_note, Some(69));
//! ```

#[cfg(feature = "live")]
pub mod live;
pub mod offline;
pub mod pitch;
pub mod trace;

#[cfg(feature = "live")]
pub use live::{run_capture_thread, CaptureSettings, LiveCaptureState};
pub use offline::analyze_samples;
pub use pitch::{autocorrelate, CorrelationMethod, PitchEstimator, PitchResult};
pub use trace::{PitchTrace, TraceWriter};

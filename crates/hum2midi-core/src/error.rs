//! Error types for hum2midi-core.

use thiserror::Error;

/// Error type for constructing core values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid note: midi={midi}, velocity={velocity}. Expected midi 0-127 and velocity 1-127")]
    InvalidNote { midi: i32, velocity: i32 },

    #[error("Invalid note duration: {0}. Must be finite and greater than zero")]
    InvalidDuration(f64),

    #[error("Invalid note start: {0}. Must be finite and non-negative")]
    InvalidStart(f64),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

//! Error types for hum2midi-transcribe

use thiserror::Error;

/// Transcription error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranscribeError {
    /// Window end is not after its start
    #[error("Invalid window: end ({end:.2}s) must be after start ({start:.2}s). Set a valid trim range first")]
    InvalidWindow { start: f64, end: f64 },

    /// No usable pitch frames inside the window
    #[error("No pitch data between {start:.2}s and {end:.2}s. Record some humming in that range first")]
    NoDataInWindow { start: f64, end: f64 },

    /// Pitch floor above ceiling, or ceiling above 127
    #[error("Invalid pitch range: floor={floor}, ceiling={ceiling}. Expected floor <= ceiling <= 127")]
    InvalidPitchRange { floor: u8, ceiling: u8 },

    /// Note index out of bounds
    #[error("Note index {index} out of range (composition has {len} notes)")]
    NoteIndex { index: usize, len: usize },
}

/// Result type for transcription operations
pub type Result<T> = std::result::Result<T, TranscribeError>;

//! Error types for hum2midi-midi

use thiserror::Error;

/// Export error type
///
/// Every check runs before any byte is written, so a failed export never
/// yields a partial file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// Tempo that cannot be expressed as a 24-bit microseconds-per-quarter value
    #[error("Invalid tempo: {0} BPM")]
    InvalidTempo(f64),

    /// Note pitch outside 0-127
    #[error("Invalid note #{index}: MIDI pitch {midi} is outside 0-127")]
    InvalidNote { index: usize, midi: u8 },

    /// Note start or duration that is not a usable time
    #[error("Invalid timing on note #{index}: start={start}, duration={duration}")]
    InvalidTiming {
        index: usize,
        start: f64,
        duration: f64,
    },

    /// Event time past the largest delta a MIDI file can hold
    #[error("Note #{index} ends at tick {tick}, beyond the MIDI delta-time limit")]
    TickOverflow { index: usize, tick: f64 },
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

//! Centralized error type for the hum2midi umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] hum2midi_core::Error),

    #[error("Transcribe: {0}")]
    Transcribe(#[from] hum2midi_transcribe::TranscribeError),

    #[error("Export: {0}")]
    Export(#[from] hum2midi_midi::ExportError),

    #[error("Nothing to export: the composition has no notes")]
    EmptyComposition,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[cfg(feature = "wav")]
    #[error("WAV: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

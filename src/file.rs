//! Whole-file transcription: WAV in, session with a converted composition out.

use crate::wav::read_wav_mono;
use crate::{Result, Session, SessionConfig};
use std::path::Path;
use tracing::info;

/// Settings for [`transcribe_file`].
#[derive(Debug, Clone, PartialEq)]
pub struct FileOptions {
    pub bpm: f64,
    /// Trim start in seconds (default: 0)
    pub start: Option<f64>,
    /// Trim end in seconds (default: end of file)
    pub end: Option<f64>,
    pub pitch_floor: u8,
    pub pitch_ceiling: u8,
    /// Semitones applied after conversion
    pub transpose: i32,
    pub block_size: usize,
}

impl Default for FileOptions {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            bpm: config.bpm,
            start: None,
            end: None,
            pitch_floor: config.pitch_floor,
            pitch_ceiling: config.pitch_ceiling,
            transpose: 0,
            block_size: config.block_size,
        }
    }
}

/// Run a WAV file through the capture path, then convert the trimmed window.
///
/// The file is fed block by block exactly as a live recording would be.
pub fn transcribe_file(path: impl AsRef<Path>, options: &FileOptions) -> Result<Session> {
    let audio = read_wav_mono(path.as_ref())?;

    let mut session = Session::builder()
        .sample_rate(audio.sample_rate)
        .block_size(options.block_size)
        .bpm(options.bpm)
        .pitch_range(options.pitch_floor, options.pitch_ceiling)
        .max_recording_secs(audio.duration_secs().max(1.0))
        .build()?;

    session.start_recording();
    session.process_samples(&audio.samples);
    session.stop_recording();

    if let Some(end) = options.end {
        session.set_trim_end(end);
    }
    if let Some(start) = options.start {
        session.set_trim_start(start);
    }

    let notes = session.convert()?.len();
    if options.transpose != 0 {
        session.transpose(options.transpose);
    }

    info!(
        path = %path.as_ref().display(),
        notes,
        frames = session.trace().len(),
        "transcribed file"
    );
    Ok(session)
}

//! WAV input.

use crate::Result;
use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::debug;

/// Mono audio decoded from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoAudio {
    pub samples: Vec<f32>,
    pub sample_rate: f64,
}

impl MonoAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }
}

/// Read a WAV file as mono `f32` samples in [-1, 1].
///
/// Channels are averaged per frame. Integer samples are scaled by their bit
/// depth.
pub fn read_wav_mono(path: impl AsRef<Path>) -> Result<MonoAudio> {
    let mut reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<f32>, _>>()?
        }
    };

    let samples: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    debug!(
        path = %path.as_ref().display(),
        channels,
        sample_rate = spec.sample_rate,
        frames = samples.len(),
        "read WAV"
    );

    Ok(MonoAudio {
        samples,
        sample_rate: f64::from(spec.sample_rate),
    })
}

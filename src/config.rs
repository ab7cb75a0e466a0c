//! Session configuration.

use crate::{Error, Result};
use hum2midi_analysis::pitch::DEFAULT_MAX_FREQUENCY;
use hum2midi_analysis::CorrelationMethod;
use hum2midi_core::{clamp_bpm, DEFAULT_BPM, DEFAULT_PITCH_CEILING, DEFAULT_PITCH_FLOOR};

/// Configuration for a transcription session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub sample_rate: f64,
    /// Samples per analysed block.
    pub block_size: usize,
    /// Quantization and export tempo. Out-of-range values are clamped, not
    /// rejected.
    pub bpm: f64,
    pub pitch_floor: u8,
    pub pitch_ceiling: u8,
    /// Estimates at or above this frequency count as unvoiced.
    pub max_frequency_hz: f64,
    /// Sizes the pitch trace; frames past this length are dropped.
    pub max_recording_secs: f64,
    pub correlation: CorrelationMethod,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            block_size: 2048,
            bpm: DEFAULT_BPM,
            pitch_floor: DEFAULT_PITCH_FLOOR,
            pitch_ceiling: DEFAULT_PITCH_CEILING,
            max_frequency_hz: DEFAULT_MAX_FREQUENCY,
            max_recording_secs: 600.0,
            correlation: CorrelationMethod::Auto,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if !(64..=32768).contains(&self.block_size) {
            return Err(Error::InvalidConfig(format!(
                "block_size {} out of range (64-32768 samples)",
                self.block_size
            )));
        }
        if self.pitch_floor > self.pitch_ceiling || self.pitch_ceiling > 127 {
            return Err(Error::InvalidConfig(format!(
                "pitch range {}-{} must satisfy floor <= ceiling <= 127",
                self.pitch_floor, self.pitch_ceiling
            )));
        }
        if !(self.max_frequency_hz > 0.0) || !self.max_frequency_hz.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "max_frequency_hz {} must be positive",
                self.max_frequency_hz
            )));
        }
        if !(self.max_recording_secs > 0.0) || !self.max_recording_secs.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "max_recording_secs {} must be positive",
                self.max_recording_secs
            )));
        }
        Ok(())
    }

    /// The tempo actually used for quantization and export.
    pub fn effective_bpm(&self) -> f64 {
        clamp_bpm(self.bpm)
    }

    /// Trace capacity in frames for one maximum-length recording.
    pub fn trace_capacity(&self) -> usize {
        let blocks = (self.max_recording_secs * self.sample_rate / self.block_size as f64).ceil();
        blocks.max(1.0) as usize
    }
}

//! Builder for configuring and constructing a [`Session`].

use crate::{Result, Session, SessionConfig};
use hum2midi_analysis::CorrelationMethod;

/// Every setting starts at its [`SessionConfig`] default; `build()` validates
/// the result.
///
/// # Example
///
/// ```rust
/// use hum2midi::Session;
///
/// let session = Session::builder()
///     .sample_rate(48000.0)
///     .bpm(96.0)
///     .pitch_range(48, 72)
///     .build()?;
/// assert_eq!(session.pitch_range(), (48, 72));
/// # Ok::<(), hum2midi::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    config: SessionConfig,
}

impl SessionBuilder {
    /// Start from an existing configuration.
    pub fn from_config(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 2048
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.config.block_size = block_size;
        self
    }

    /// Default: 110. Clamped to 40-220 when used.
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.config.bpm = bpm;
        self
    }

    /// Default: 36-84 (C2-C6)
    pub fn pitch_range(mut self, floor: u8, ceiling: u8) -> Self {
        self.config.pitch_floor = floor;
        self.config.pitch_ceiling = ceiling;
        self
    }

    /// Default: 2500 Hz
    pub fn max_frequency(mut self, hz: f64) -> Self {
        self.config.max_frequency_hz = hz;
        self
    }

    /// Default: 600 s
    pub fn max_recording_secs(mut self, secs: f64) -> Self {
        self.config.max_recording_secs = secs;
        self
    }

    pub fn correlation(mut self, method: CorrelationMethod) -> Self {
        self.config.correlation = method;
        self
    }

    pub fn build(self) -> Result<Session> {
        Session::new(self.config)
    }
}

//! Pitch estimation by trimmed autocorrelation
//!
//! Monophonic pitch tracking for hummed or sung input, one block at a time.
//!
//! ## Algorithm
//!
//! 1. **Silence gate** - blocks whose RMS is below 0.01 are unvoiced
//! 2. **Edge trim** - scan inward from both ends to the first sample below
//!    0.2 of full scale, dropping loud tails that smear the correlation
//! 3. **Autocorrelation** - c(τ) = Σ x[j]·x[j+τ] over the trimmed window
//! 4. **Falloff skip** - walk past the decreasing run that starts at lag 0
//! 5. **Peak pick** - global maximum of c from the end of that run
//! 6. **Parabolic interpolation** - sub-sample period from the peak and its
//!    two neighbours; periods under 2 samples are rejected
//!
//! Frequency = sample_rate / period.
//!
//! ## Performance
//!
//! Direct correlation is O(n²) in the trimmed length. For windows longer than
//! [`FFT_THRESHOLD`] samples the correlation is computed as IFFT(|FFT(x)|²)
//! over a zero-padded buffer, which yields the same lags up to rounding.
//! Buffers are allocated once per block size and reused afterwards.

use hum2midi_core::{cents_offset, hz_to_midi, note_name, note_name_flat};
use rustfft::{num_complex::Complex, FftPlanner};
use tracing::trace;

/// RMS below which a block is treated as silence.
pub const SILENCE_RMS: f64 = 0.01;

/// Amplitude below which the edge trim stops scanning.
pub const TRIM_THRESHOLD: f64 = 0.2;

/// Shortest accepted period in samples.
pub const MIN_PERIOD: f64 = 2.0;

/// Highest frequency accepted by [`PitchEstimator::detect`].
pub const DEFAULT_MAX_FREQUENCY: f64 = 2500.0;

/// Trimmed length above which [`CorrelationMethod::Auto`] switches to FFT.
pub const FFT_THRESHOLD: usize = 1024;

/// How the autocorrelation is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum CorrelationMethod {
    /// Direct O(n²) sum
    Direct,
    /// Wiener-Khinchin via rustfft
    Fft,
    /// Direct for short windows, FFT above [`FFT_THRESHOLD`]
    #[default]
    Auto,
}

/// Result of pitch detection for a single block
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PitchResult {
    /// Detected frequency in Hz (0.0 if unvoiced)
    pub frequency: f64,
    /// Nearest MIDI note (if voiced)
    pub midi_note: Option<i32>,
    /// Cents deviation from the nearest note (-50 to +50)
    pub cents_offset: f64,
}

impl PitchResult {
    /// Build a voiced result from a frequency.
    pub fn from_frequency(frequency: f64) -> Self {
        Self {
            frequency,
            midi_note: Some(hz_to_midi(frequency)),
            cents_offset: cents_offset(frequency),
        }
    }

    /// Check if a pitch was detected
    pub fn is_voiced(&self) -> bool {
        self.frequency > 0.0 && self.midi_note.is_some()
    }

    /// Note name with sharp notation (e.g., "A4", "C#5")
    pub fn note_name(&self) -> Option<String> {
        self.midi_note.map(note_name)
    }

    /// Note name with flat notation (e.g., "A4", "Db5")
    pub fn note_name_flat(&self) -> Option<String> {
        self.midi_note.map(note_name_flat)
    }
}

/// Block-based pitch estimator.
///
/// Holds reusable correlation buffers and FFT plans; the estimate itself is a
/// pure function of the block and the sample rate.
pub struct PitchEstimator {
    sample_rate: f64,
    max_frequency: f64,
    method: CorrelationMethod,

    // Pre-allocated buffers
    trimmed: Vec<f64>,
    correlation: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
    fft_planner: FftPlanner<f64>,
}

impl PitchEstimator {
    /// Create an estimator for the given sample rate.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            method: CorrelationMethod::Auto,
            trimmed: Vec::new(),
            correlation: Vec::new(),
            spectrum: Vec::new(),
            scratch: Vec::new(),
            fft_planner: FftPlanner::new(),
        }
    }

    /// Create an estimator with buffers sized for `block_size` samples.
    pub fn with_block_size(sample_rate: f64, block_size: usize) -> Self {
        let mut estimator = Self::new(sample_rate);
        estimator.trimmed.reserve(block_size);
        estimator.correlation.reserve(block_size);
        estimator
    }

    /// Set the upper frequency bound used by [`detect`](Self::detect).
    pub fn set_max_frequency(&mut self, max_frequency: f64) {
        self.max_frequency = max_frequency;
    }

    /// Select how the autocorrelation is computed.
    pub fn set_method(&mut self, method: CorrelationMethod) {
        self.method = method;
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_frequency(&self) -> f64 {
        self.max_frequency
    }

    pub fn method(&self) -> CorrelationMethod {
        self.method
    }

    /// Raw autocorrelation estimate for one block.
    ///
    /// Returns `None` when the block is silent or no reliable period exists.
    /// No frequency bound is applied; see [`detect`](Self::detect).
    pub fn estimate(&mut self, block: &[f32]) -> Option<f64> {
        if block.is_empty() || rms(block) < SILENCE_RMS {
            return None;
        }

        let (r1, r2) = trim_bounds(block);
        if r1 >= r2 {
            return None;
        }

        self.trimmed.clear();
        self.trimmed
            .extend(block[r1..r2].iter().map(|&s| f64::from(s)));

        let use_fft = match self.method {
            CorrelationMethod::Direct => false,
            CorrelationMethod::Fft => true,
            CorrelationMethod::Auto => self.trimmed.len() > FFT_THRESHOLD,
        };
        if use_fft {
            self.correlate_fft();
        } else {
            correlate_direct(&self.trimmed, &mut self.correlation);
        }

        let peak = pick_peak(&self.correlation)?;
        let period = refine_period(&self.correlation, peak);
        // Also rejects NaN
        if !(period >= MIN_PERIOD) {
            return None;
        }

        Some(self.sample_rate / period)
    }

    /// Estimate and validate one block.
    ///
    /// Estimates that are non-finite or at/above the maximum frequency are
    /// reported as unvoiced.
    pub fn detect(&mut self, block: &[f32]) -> PitchResult {
        match self.estimate(block) {
            Some(freq) if freq.is_finite() && freq > 0.0 && freq < self.max_frequency => {
                trace!(frequency = freq, "pitch estimate");
                PitchResult::from_frequency(freq)
            }
            _ => PitchResult::default(),
        }
    }

    /// Detect pitch over consecutive non-overlapping blocks of a buffer.
    ///
    /// A trailing partial block is ignored.
    pub fn detect_track(&mut self, samples: &[f32], block_size: usize) -> Vec<PitchResult> {
        if block_size == 0 {
            return Vec::new();
        }
        samples
            .chunks_exact(block_size)
            .map(|block| self.detect(block))
            .collect()
    }

    /// Autocorrelation via zero-padded FFT: c = IFFT(|FFT(x)|²) / N.
    fn correlate_fft(&mut self) {
        let n = self.trimmed.len();
        let fft_size = (2 * n).next_power_of_two();

        let forward = self.fft_planner.plan_fft_forward(fft_size);
        let inverse = self.fft_planner.plan_fft_inverse(fft_size);

        self.spectrum.clear();
        self.spectrum
            .extend(self.trimmed.iter().map(|&x| Complex::new(x, 0.0)));
        self.spectrum.resize(fft_size, Complex::new(0.0, 0.0));

        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        if self.scratch.len() < scratch_len {
            self.scratch.resize(scratch_len, Complex::new(0.0, 0.0));
        }

        forward.process_with_scratch(&mut self.spectrum, &mut self.scratch[..scratch_len]);
        for bin in self.spectrum.iter_mut() {
            *bin = Complex::new(bin.norm_sqr(), 0.0);
        }
        inverse.process_with_scratch(&mut self.spectrum, &mut self.scratch[..scratch_len]);

        let scale = 1.0 / fft_size as f64;
        self.correlation.clear();
        self.correlation
            .extend(self.spectrum[..n].iter().map(|c| c.re * scale));
    }
}

/// Estimate the fundamental frequency of one block.
///
/// Convenience wrapper that allocates its own buffers and always uses the
/// direct correlation. Returns `None` when no reliable pitch is found.
pub fn autocorrelate(block: &[f32], sample_rate: f64) -> Option<f64> {
    let mut estimator = PitchEstimator::new(sample_rate);
    estimator.set_method(CorrelationMethod::Direct);
    estimator.estimate(block)
}

fn rms(block: &[f32]) -> f64 {
    let sum_sq: f64 = block.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / block.len() as f64).sqrt()
}

/// Half-open `[r1, r2)` window left after trimming loud edges.
///
/// Each scan covers the first half of the block from its side. When no quiet
/// sample is found the window keeps its start and drops the final sample.
fn trim_bounds(block: &[f32]) -> (usize, usize) {
    let size = block.len();
    let half = size.div_ceil(2);
    let quiet = |i: usize| f64::from(block[i]).abs() < TRIM_THRESHOLD;

    let r1 = (0..half).find(|&i| quiet(i)).unwrap_or(0);
    let r2 = (1..half)
        .map(|i| size - i)
        .find(|&i| quiet(i))
        .unwrap_or(size - 1);
    (r1, r2)
}

fn correlate_direct(x: &[f64], out: &mut Vec<f64>) {
    let n = x.len();
    out.clear();
    out.extend((0..n).map(|lag| {
        x[..n - lag]
            .iter()
            .zip(&x[lag..])
            .map(|(a, b)| a * b)
            .sum::<f64>()
    }));
}

/// Lag of the strongest correlation after the initial falloff.
///
/// Values at or below -1 never qualify; lag 0 is never a valid period.
fn pick_peak(c: &[f64]) -> Option<usize> {
    let mut d = 0;
    while d + 1 < c.len() && c[d] > c[d + 1] {
        d += 1;
    }

    let mut max_val = -1.0;
    let mut max_pos = None;
    for (i, &v) in c.iter().enumerate().skip(d) {
        if v > max_val {
            max_val = v;
            max_pos = Some(i);
        }
    }

    max_pos.filter(|&pos| pos > 0)
}

/// Vertex of the parabola through the peak and its neighbours.
///
/// Missing neighbours fall back to the peak value.
fn refine_period(c: &[f64], pos: usize) -> f64 {
    let x2 = c[pos];
    let x1 = if pos > 0 { c[pos - 1] } else { x2 };
    let x3 = c.get(pos + 1).copied().unwrap_or(x2);

    let a = (x1 + x3 - 2.0 * x2) / 2.0;
    let b = (x3 - x1) / 2.0;
    let shift = if a != 0.0 { -b / (2.0 * a) } else { 0.0 };

    pos as f64 + shift
}

//! Offline analysis of a whole buffer.

use crate::{CorrelationMethod, PitchEstimator, PitchTrace, TraceWriter};
use hum2midi_core::PitchFrame;
use std::sync::Arc;

/// Produce the pitch frames a recording of `samples` would have captured.
///
/// The buffer is cut into consecutive `block_size` blocks (a trailing partial
/// block is ignored) and each block goes through the same estimator and
/// trace clock as live capture.
pub fn analyze_samples(
    samples: &[f32],
    sample_rate: f64,
    block_size: usize,
    max_frequency: f64,
    method: CorrelationMethod,
) -> Vec<PitchFrame> {
    if block_size == 0 {
        return Vec::new();
    }

    let trace = Arc::new(PitchTrace::with_capacity(samples.len() / block_size + 1));
    let mut writer = TraceWriter::new(trace.clone(), sample_rate);
    let mut estimator = PitchEstimator::with_block_size(sample_rate, block_size);
    estimator.set_max_frequency(max_frequency);
    estimator.set_method(method);

    trace.begin_recording();
    for block in samples.chunks_exact(block_size) {
        let result = estimator.detect(block);
        writer.record(block.len(), &result);
    }
    trace.end_recording();

    trace.snapshot()
}

//! Live capture via ring buffer tap.
//!
//! Runs pitch estimation on a background thread, reading mono samples from a
//! SPSC ring buffer fed by the audio callback. The latest estimate is
//! published via `ArcSwap` for lock-free reads from the UI thread, and voiced
//! estimates are appended to the shared [`PitchTrace`] while it is recording.

use crate::{CorrelationMethod, PitchEstimator, PitchResult, PitchTrace, TraceWriter};
use arc_swap::ArcSwap;
use core::sync::atomic::{AtomicBool, Ordering};
use ringbuf::{
    traits::{Consumer, Observer},
    HeapCons,
};
use std::sync::Arc;
use tracing::debug;

/// Shared state between the capture thread and its observers.
pub struct LiveCaptureState {
    /// Latest pitch estimate (for live frequency / note readout).
    pub pitch: ArcSwap<PitchResult>,
    /// Set to false to signal the capture thread to stop.
    running: AtomicBool,
}

impl LiveCaptureState {
    pub fn new() -> Self {
        Self {
            pitch: ArcSwap::from_pointee(PitchResult::default()),
            running: AtomicBool::new(true),
        }
    }

    /// Signal the capture thread to stop.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Check if the capture thread should keep running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Default for LiveCaptureState {
    fn default() -> Self {
        Self::new()
    }
}

/// Block and hop sizes for the capture loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureSettings {
    pub sample_rate: f64,
    /// Samples per analysed block.
    pub block_size: usize,
    /// Samples between analyses (≤ block_size; equal means no overlap).
    pub hop_size: usize,
    pub max_frequency: f64,
    pub method: CorrelationMethod,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            block_size: 2048,
            hop_size: 2048,
            max_frequency: crate::pitch::DEFAULT_MAX_FREQUENCY,
            method: CorrelationMethod::Auto,
        }
    }
}

/// Run the live capture loop.
///
/// Drains mono samples from `consumer` into a sliding window and estimates
/// pitch every `hop_size` samples once a full block is available.
///
/// This function blocks until `state.stop()` is called.
pub fn run_capture_thread(
    mut consumer: HeapCons<f32>,
    state: Arc<LiveCaptureState>,
    trace: Arc<PitchTrace>,
    settings: CaptureSettings,
) {
    let block_size = settings.block_size.max(1);
    let hop_size = settings.hop_size.clamp(1, block_size);

    let mut estimator = PitchEstimator::with_block_size(settings.sample_rate, block_size);
    estimator.set_max_frequency(settings.max_frequency);
    estimator.set_method(settings.method);
    let mut writer = TraceWriter::new(trace, settings.sample_rate);

    // Circular window of the most recent samples
    let mut window = vec![0.0f32; block_size];
    let mut contiguous = vec![0.0f32; block_size];
    let mut window_pos = 0usize;
    let mut hop_counter = 0usize;

    let mut drain_buf = [0.0f32; 1024];

    debug!(block_size, hop_size, "capture thread started");

    while state.is_running() {
        let available = consumer.occupied_len();

        if available == 0 {
            std::thread::sleep(std::time::Duration::from_millis(5));
            continue;
        }

        let to_read = available.min(drain_buf.len());
        let read = consumer.pop_slice(&mut drain_buf[..to_read]);

        for &sample in &drain_buf[..read] {
            window[window_pos % block_size] = sample;
            window_pos += 1;
            hop_counter += 1;

            if hop_counter >= hop_size && window_pos >= block_size {
                // Reconstruct contiguous block from circular buffer
                let start = window_pos % block_size;
                let tail = block_size - start;
                contiguous[..tail].copy_from_slice(&window[start..]);
                contiguous[tail..].copy_from_slice(&window[..start]);

                let result = estimator.detect(&contiguous);
                state.pitch.store(Arc::new(result));
                writer.record(hop_counter, &result);
                hop_counter = 0;
            }
        }
    }

    debug!("capture thread stopped");
}

//! Pitch trace: the append-only frame buffer of one recording.
//!
//! One [`TraceWriter`] appends frames while any number of readers take
//! snapshots. The frame vector is pre-sized from the maximum recording length
//! and never grows past it; frames that arrive after it is full are dropped.
//!
//! Readers copy the current prefix under a short read lock, so a conversion
//! started while capture is still live sees a consistent, time-ordered slice.

use crate::PitchResult;
use hum2midi_core::PitchFrame;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Frame buffer shared between the capture loop and the conversion side.
pub struct PitchTrace {
    frames: RwLock<Vec<PitchFrame>>,
    capacity: usize,
    recording: AtomicBool,
    /// Bumped (under the write lock) every time a recording starts.
    generation: AtomicU64,
    recorded_secs: AtomicU64,
    overflowed: AtomicBool,
}

impl PitchTrace {
    /// Create a trace that holds at most `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: RwLock::new(Vec::with_capacity(capacity)),
            capacity,
            recording: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            recorded_secs: AtomicU64::new(0f64.to_bits()),
            overflowed: AtomicBool::new(false),
        }
    }

    /// Create a trace sized for `max_secs` of audio analysed in hops of
    /// `hop_size` samples.
    pub fn for_duration(max_secs: f64, sample_rate: f64, hop_size: usize) -> Self {
        let hops = (max_secs * sample_rate / hop_size.max(1) as f64).ceil();
        Self::with_capacity(hops.max(1.0) as usize)
    }

    /// Maximum number of frames this trace can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.read().is_empty()
    }

    /// Whether frames are currently being captured.
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// Identifier of the current (or last) recording.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Length of the current (or last) recording in seconds.
    pub fn recorded_secs(&self) -> f64 {
        f64::from_bits(self.recorded_secs.load(Ordering::Acquire))
    }

    /// Start a new recording: drop all frames and restart the clock.
    ///
    /// The allocation is kept.
    pub fn begin_recording(&self) {
        let mut frames = self.frames.write();
        frames.clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.recorded_secs
            .store(0f64.to_bits(), Ordering::Release);
        self.overflowed.store(false, Ordering::Release);
        self.recording.store(true, Ordering::Release);
        debug!(generation = self.generation(), "recording started");
    }

    /// Stop capturing. Returns the recorded duration in seconds.
    pub fn end_recording(&self) -> f64 {
        self.recording.store(false, Ordering::Release);
        let secs = self.recorded_secs();
        debug!(
            frames = self.len(),
            seconds = secs,
            "recording stopped"
        );
        secs
    }

    /// Append a frame to the current recording.
    ///
    /// Returns `false` if the trace is full. A frame stamped earlier than the
    /// last one is moved up to the last timestamp.
    pub fn push(&self, frame: PitchFrame) -> bool {
        let mut frames = self.frames.write();
        self.push_locked(&mut frames, frame)
    }

    /// Append only if no new recording has started since `generation`.
    fn push_in_generation(&self, frame: PitchFrame, generation: u64) -> bool {
        let mut frames = self.frames.write();
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        self.push_locked(&mut frames, frame)
    }

    fn push_locked(&self, frames: &mut Vec<PitchFrame>, mut frame: PitchFrame) -> bool {
        if frames.len() >= self.capacity {
            if !self.overflowed.swap(true, Ordering::AcqRel) {
                warn!(
                    capacity = self.capacity,
                    "pitch trace full, dropping further frames"
                );
            }
            return false;
        }
        if let Some(last) = frames.last() {
            if frame.t < last.t {
                frame.t = last.t;
            }
        }
        frames.push(frame);
        true
    }

    fn set_recorded_secs(&self, secs: f64) {
        self.recorded_secs.store(secs.to_bits(), Ordering::Release);
    }

    /// Copy of every frame captured so far.
    pub fn snapshot(&self) -> Vec<PitchFrame> {
        self.frames.read().clone()
    }

    /// Copy of the frames with `start <= t <= end`.
    pub fn snapshot_window(&self, start: f64, end: f64) -> Vec<PitchFrame> {
        let frames = self.frames.read();
        let lo = frames.partition_point(|f| f.t < start);
        let hi = frames.partition_point(|f| f.t <= end);
        if lo >= hi {
            return Vec::new();
        }
        frames[lo..hi].to_vec()
    }
}

/// The single writer of a [`PitchTrace`].
///
/// Owns the recording clock: timestamps are the number of samples consumed
/// since the recording started, divided by the sample rate. A frame is stamped
/// with the time its block completed.
pub struct TraceWriter {
    trace: Arc<PitchTrace>,
    sample_rate: f64,
    generation: u64,
    elapsed_samples: u64,
}

impl TraceWriter {
    pub fn new(trace: Arc<PitchTrace>, sample_rate: f64) -> Self {
        let generation = trace.generation();
        Self {
            trace,
            sample_rate,
            generation,
            elapsed_samples: 0,
        }
    }

    pub fn trace(&self) -> &Arc<PitchTrace> {
        &self.trace
    }

    /// Advance the clock by `advance` samples and record `result` if voiced.
    ///
    /// Does nothing while the trace is not recording. Returns the appended
    /// frame.
    pub fn record(&mut self, advance: usize, result: &PitchResult) -> Option<PitchFrame> {
        if !self.trace.is_recording() {
            return None;
        }

        let generation = self.trace.generation();
        if generation != self.generation {
            self.generation = generation;
            self.elapsed_samples = 0;
        }

        self.elapsed_samples += advance as u64;
        let t = self.elapsed_samples as f64 / self.sample_rate;
        self.trace.set_recorded_secs(t);

        let midi = result.midi_note?;
        if !result.is_voiced() {
            return None;
        }
        let frame = PitchFrame {
            t,
            freq_hz: result.frequency,
            midi,
        };
        self.trace
            .push_in_generation(frame, generation)
            .then_some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame(t: f64, midi: i32) -> PitchFrame {
        PitchFrame {
            t,
            freq_hz: hum2midi_core::midi_to_hz(midi),
            midi,
        }
    }

    fn voiced(freq: f64) -> PitchResult {
        PitchResult::from_frequency(freq)
    }

    #[test]
    fn test_push_and_snapshot() {
        let trace = PitchTrace::with_capacity(8);
        assert!(trace.push(frame(0.0, 60)));
        assert!(trace.push(frame(0.1, 62)));
        assert_eq!(trace.len(), 2);

        let snap = trace.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[1].midi, 62);

        // The snapshot is a copy: later pushes do not change it
        trace.push(frame(0.2, 64));
        assert_eq!(snap.len(), 2);
        assert_eq!(trace.len(), 3);
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let trace = PitchTrace::with_capacity(8);
        trace.push(frame(0.5, 60));
        trace.push(frame(0.3, 60));
        trace.push(frame(0.5, 61));

        let times: Vec<f64> = trace.snapshot().iter().map(|f| f.t).collect();
        assert_eq!(times, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_capacity_is_a_hard_cap() {
        let trace = PitchTrace::with_capacity(2);
        assert!(trace.push(frame(0.0, 60)));
        assert!(trace.push(frame(0.1, 60)));
        assert!(!trace.push(frame(0.2, 60)));
        assert!(!trace.push(frame(0.3, 60)));
        assert_eq!(trace.len(), 2);

        // A new recording makes room again
        trace.begin_recording();
        assert!(trace.is_empty());
        assert!(trace.push(frame(0.0, 60)));
    }

    #[test]
    fn test_for_duration_capacity() {
        let trace = PitchTrace::for_duration(10.0, 44100.0, 2048);
        assert_eq!(trace.capacity(), 216);
    }

    #[test]
    fn test_snapshot_window_is_inclusive() {
        let trace = PitchTrace::with_capacity(16);
        for i in 0..10 {
            trace.push(frame(i as f64 * 0.1, 60));
        }

        let window = trace.snapshot_window(0.2, 0.5);
        assert_eq!(window.len(), 4);
        assert_eq!(window.first().unwrap().t, 0.2);
        assert_relative_eq!(window.last().unwrap().t, 0.5, epsilon = 1e-12);

        assert!(trace.snapshot_window(5.0, 6.0).is_empty());
        assert!(trace.snapshot_window(0.6, 0.2).is_empty());
    }

    #[test]
    fn test_writer_ignores_blocks_when_not_recording() {
        let trace = Arc::new(PitchTrace::with_capacity(16));
        let mut writer = TraceWriter::new(trace.clone(), 1000.0);

        assert!(writer.record(100, &voiced(440.0)).is_none());
        assert!(trace.is_empty());
        assert_eq!(trace.recorded_secs(), 0.0);
    }

    #[test]
    fn test_writer_clock() {
        let trace = Arc::new(PitchTrace::with_capacity(16));
        let mut writer = TraceWriter::new(trace.clone(), 1000.0);
        trace.begin_recording();

        let first = writer.record(100, &voiced(440.0)).unwrap();
        assert_relative_eq!(first.t, 0.1, epsilon = 1e-12);
        assert_eq!(first.midi, 69);

        // Unvoiced blocks advance the clock without adding a frame
        assert!(writer.record(100, &PitchResult::default()).is_none());
        let third = writer.record(100, &voiced(220.0)).unwrap();
        assert_relative_eq!(third.t, 0.3, epsilon = 1e-12);
        assert_eq!(trace.len(), 2);
        assert_relative_eq!(trace.recorded_secs(), 0.3, epsilon = 1e-12);

        assert_relative_eq!(trace.end_recording(), 0.3, epsilon = 1e-12);
        assert!(writer.record(100, &voiced(440.0)).is_none());
    }

    #[test]
    fn test_new_recording_resets_clock() {
        let trace = Arc::new(PitchTrace::with_capacity(16));
        let mut writer = TraceWriter::new(trace.clone(), 1000.0);

        trace.begin_recording();
        writer.record(500, &voiced(440.0));
        trace.end_recording();

        trace.begin_recording();
        let frame = writer.record(100, &voiced(440.0)).unwrap();
        assert_relative_eq!(frame.t, 0.1, epsilon = 1e-12);
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_concurrent_snapshots_see_ordered_prefix() {
        let trace = Arc::new(PitchTrace::with_capacity(4096));
        trace.begin_recording();

        let writer_trace = trace.clone();
        let handle = std::thread::spawn(move || {
            let mut writer = TraceWriter::new(writer_trace, 1000.0);
            for _ in 0..2000 {
                writer.record(10, &voiced(440.0));
            }
        });

        for _ in 0..50 {
            let snap = trace.snapshot();
            assert!(snap.windows(2).all(|w| w[0].t <= w[1].t));
        }
        handle.join().unwrap();

        assert_eq!(trace.len(), 2000);
    }
}

//! Record → convert → edit → export orchestration.

use crate::{Error, Result, SessionBuilder, SessionConfig, TrimRange};
use hum2midi_analysis::{PitchEstimator, PitchResult, PitchTrace, TraceWriter};
use hum2midi_core::{NoteEvent, PitchFrame};
use hum2midi_transcribe::{Composition, QuantizeParams};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[cfg(feature = "live")]
use hum2midi_analysis::{run_capture_thread, CaptureSettings, LiveCaptureState};
#[cfg(feature = "live")]
use ringbuf::HeapCons;

/// File name used when the caller does not choose one.
pub const DEFAULT_EXPORT_FILENAME: &str = "hum2midi-export.mid";

/// One hum-to-MIDI session.
///
/// Audio reaches the pitch trace either block by block through
/// [`process_block`](Self::process_block) or from a background capture thread
/// (see `enable_live_capture`). Only one of the two should feed a recording.
///
/// # Example
///
/// ```rust
/// use hum2midi::Session;
///
/// let mut session = Session::builder().bpm(120.0).build()?;
///
/// session.start_recording();
/// let block: Vec<f32> = (0..2048)
///     .map(|i| (2.0 * std::f32::consts::PI * 261.63 * i as f32 / 44100.0).sin() * 0.5)
///     .collect();
/// for _ in 0..20 {
///     session.process_block(&block);
/// }
/// session.stop_recording();
///
/// let notes = session.convert()?;
/// assert_eq!(notes[0].midi, 60);
/// let bytes = session.export_midi()?;
/// assert_eq!(&bytes[..4], b"MThd");
/// # Ok::<(), hum2midi::Error>(())
/// ```
pub struct Session {
    config: SessionConfig,
    trace: Arc<PitchTrace>,
    writer: TraceWriter,
    estimator: PitchEstimator,
    composition: Composition,
    trim: TrimRange,
    last_pitch: PitchResult,
    /// Samples carried over until a full block is available.
    pending: Vec<f32>,

    #[cfg(feature = "live")]
    live: Option<(Arc<LiveCaptureState>, std::thread::JoinHandle<()>)>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let trace = Arc::new(PitchTrace::with_capacity(config.trace_capacity()));
        let writer = TraceWriter::new(trace.clone(), config.sample_rate);
        let mut estimator = PitchEstimator::with_block_size(config.sample_rate, config.block_size);
        estimator.set_max_frequency(config.max_frequency_hz);
        estimator.set_method(config.correlation);

        debug!(
            sample_rate = config.sample_rate,
            block_size = config.block_size,
            capacity = trace.capacity(),
            "session created"
        );

        Ok(Self {
            composition: Composition::from_notes(Vec::new(), config.bpm),
            pending: Vec::with_capacity(config.block_size),
            config,
            trace,
            writer,
            estimator,
            trim: TrimRange::default(),
            last_pitch: PitchResult::default(),
            #[cfg(feature = "live")]
            live: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Shared handle to the pitch trace (for external capture or display).
    pub fn trace(&self) -> &Arc<PitchTrace> {
        &self.trace
    }

    /// Copy of every frame of the current (or last) recording.
    pub fn frames(&self) -> Vec<PitchFrame> {
        self.trace.snapshot()
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Start a new recording, discarding the previous trace.
    ///
    /// Does nothing if a recording is already running.
    pub fn start_recording(&mut self) {
        if self.trace.is_recording() {
            return;
        }
        self.pending.clear();
        self.trace.begin_recording();
    }

    /// End the recording and reset the trim range to all of it.
    ///
    /// Returns the recorded duration in seconds. Does nothing (and returns
    /// the last duration) if no recording is running.
    pub fn stop_recording(&mut self) -> f64 {
        if !self.trace.is_recording() {
            return self.trace.recorded_secs();
        }
        let secs = self.trace.end_recording();
        self.trim = TrimRange::full(secs);
        info!(
            seconds = secs,
            frames = self.trace.len(),
            "recording finished"
        );
        secs
    }

    pub fn is_recording(&self) -> bool {
        self.trace.is_recording()
    }

    pub fn recorded_secs(&self) -> f64 {
        self.trace.recorded_secs()
    }

    /// Estimate the pitch of one block and, while recording, add it to the
    /// trace.
    ///
    /// The block is assumed to be `block_size` samples long; its length
    /// advances the recording clock. While live capture is enabled the
    /// capture thread owns the trace and this only updates the readout.
    pub fn process_block(&mut self, block: &[f32]) -> PitchResult {
        let result = self.estimator.detect(block);
        self.last_pitch = result;
        if !self.live_capture_enabled() {
            self.writer.record(block.len(), &result);
        }
        result
    }

    /// Feed an arbitrary-length run of samples, analysing every complete
    /// block. Leftover samples wait for the next call.
    ///
    /// Returns the number of blocks analysed.
    pub fn process_samples(&mut self, mut samples: &[f32]) -> usize {
        let block_size = self.config.block_size;
        let mut blocks = 0;

        if !self.pending.is_empty() {
            let take = (block_size - self.pending.len()).min(samples.len());
            self.pending.extend_from_slice(&samples[..take]);
            samples = &samples[take..];
            if self.pending.len() < block_size {
                return 0;
            }
            let block = std::mem::take(&mut self.pending);
            self.process_block(&block);
            self.pending = block;
            self.pending.clear();
            blocks += 1;
        }

        let mut chunks = samples.chunks_exact(block_size);
        for block in &mut chunks {
            self.process_block(block);
            blocks += 1;
        }
        self.pending.extend_from_slice(chunks.remainder());
        blocks
    }

    /// Most recent estimate, for a live frequency/note readout.
    pub fn latest_pitch(&self) -> PitchResult {
        #[cfg(feature = "live")]
        if let Some((state, _)) = &self.live {
            return **state.pitch.load();
        }
        self.last_pitch
    }

    // =========================================================================
    // Live capture
    // =========================================================================

    /// Run pitch capture on a background thread fed by `consumer`.
    ///
    /// The thread writes straight into this session's trace; recordings are
    /// still started and stopped through the session. No-op if already
    /// enabled.
    #[cfg(feature = "live")]
    pub fn enable_live_capture(&mut self, consumer: HeapCons<f32>) -> Result<&mut Self> {
        if self.live.is_some() {
            return Ok(self);
        }

        let state = Arc::new(LiveCaptureState::new());
        let state2 = state.clone();
        let trace = self.trace.clone();
        let settings = CaptureSettings {
            sample_rate: self.config.sample_rate,
            block_size: self.config.block_size,
            hop_size: self.config.block_size,
            max_frequency: self.config.max_frequency_hz,
            method: self.config.correlation,
        };

        let handle = std::thread::Builder::new()
            .name("hum2midi-capture".into())
            .spawn(move || {
                run_capture_thread(consumer, state2, trace, settings);
            })?;

        self.live = Some((state, handle));
        Ok(self)
    }

    /// Stop the capture thread and wait for it to exit.
    #[cfg(feature = "live")]
    pub fn disable_live_capture(&mut self) -> &mut Self {
        if let Some((state, handle)) = self.live.take() {
            state.stop();
            let _ = handle.join();
            self.last_pitch = **state.pitch.load();
        }
        self
    }

    fn live_capture_enabled(&self) -> bool {
        #[cfg(feature = "live")]
        {
            self.live.is_some()
        }
        #[cfg(not(feature = "live"))]
        {
            false
        }
    }

    // =========================================================================
    // Trim, tempo, pitch range
    // =========================================================================

    pub fn trim(&self) -> TrimRange {
        self.trim
    }

    pub fn set_trim_start(&mut self, start: f64) {
        self.trim.set_start(start);
    }

    pub fn set_trim_end(&mut self, end: f64) {
        self.trim.set_end(end);
    }

    /// Effective tempo (clamped to 40-220).
    pub fn bpm(&self) -> f64 {
        self.config.effective_bpm()
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.config.bpm = bpm;
    }

    pub fn pitch_range(&self) -> (u8, u8) {
        (self.config.pitch_floor, self.config.pitch_ceiling)
    }

    pub fn set_pitch_range(&mut self, floor: u8, ceiling: u8) -> Result<()> {
        let config = SessionConfig {
            pitch_floor: floor,
            pitch_ceiling: ceiling,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // =========================================================================
    // Conversion and editing
    // =========================================================================

    /// Quantize the trim window into the composition.
    pub fn convert(&mut self) -> Result<&[NoteEvent]> {
        self.convert_window(self.trim.start(), self.trim.end())
    }

    /// Quantize an explicit `[start, end]` window into the composition.
    ///
    /// Works on a snapshot, so it may run while a recording is still live.
    /// On error the previous composition is kept.
    pub fn convert_window(&mut self, start: f64, end: f64) -> Result<&[NoteEvent]> {
        let params = QuantizeParams::new(start, end, self.config.bpm)
            .with_pitch_range(self.config.pitch_floor, self.config.pitch_ceiling);
        let frames = self.trace.snapshot_window(start, end);
        Ok(self.composition.quantize_from(&frames, &params)?)
    }

    pub fn notes(&self) -> &[NoteEvent] {
        self.composition.notes()
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn composition_mut(&mut self) -> &mut Composition {
        &mut self.composition
    }

    /// Shift every note, clamped to the session pitch range.
    pub fn transpose(&mut self, semitones: i32) {
        let (floor, ceiling) = self.pitch_range();
        self.composition.transpose(semitones, floor, ceiling);
    }

    pub fn octave_up(&mut self) {
        self.transpose(12);
    }

    pub fn octave_down(&mut self) {
        self.transpose(-12);
    }

    pub fn move_note(&mut self, index: usize, start: f64, midi: i32) -> Result<()> {
        let (floor, ceiling) = self.pitch_range();
        Ok(self
            .composition
            .move_note(index, start, midi, floor, ceiling)?)
    }

    pub fn resize_note(&mut self, index: usize, duration: f64) -> Result<()> {
        Ok(self.composition.resize_note(index, duration)?)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Encode the whole composition at the session tempo.
    pub fn export_midi(&self) -> Result<Vec<u8>> {
        Ok(hum2midi_midi::encode(self.composition.notes(), self.bpm())?)
    }

    /// Encode only the notes sounding inside `[start, end)`, rebased to the
    /// window start.
    pub fn export_window(&self, start: f64, end: f64) -> Result<Vec<u8>> {
        let notes = self.composition.window(start, end)?;
        Ok(hum2midi_midi::encode(&notes, self.bpm())?)
    }

    /// Encode the composition and write it to `path`.
    ///
    /// Refuses with [`Error::EmptyComposition`] when there are no notes, so
    /// no tempo-only file is left behind.
    pub fn write_midi(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.composition.is_empty() {
            return Err(Error::EmptyComposition);
        }
        let bytes = self.export_midi()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(
            path = %path.as_ref().display(),
            bytes = bytes.len(),
            notes = self.composition.len(),
            "wrote MIDI file"
        );
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        #[cfg(feature = "live")]
        self.disable_live_capture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hum2midi_transcribe::TranscribeError;

    const SR: f64 = 44100.0;

    fn sine(freq: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| ((2.0 * std::f64::consts::PI * freq * i as f64 / SR).sin() * 0.5) as f32)
            .collect()
    }

    fn session() -> Session {
        Session::builder().bpm(120.0).build().unwrap()
    }

    #[test]
    fn test_blocks_ignored_until_recording() {
        let mut session = session();
        let pitch = session.process_block(&sine(440.0, 2048));
        assert_eq!(pitch.midi_note, Some(69));
        assert_eq!(session.latest_pitch().midi_note, Some(69));
        assert!(session.frames().is_empty());
    }

    #[test]
    fn test_stop_resets_trim() {
        let mut session = session();
        session.start_recording();
        for _ in 0..10 {
            session.process_block(&sine(440.0, 2048));
        }
        let secs = session.stop_recording();

        assert_relative_eq!(secs, 10.0 * 2048.0 / SR, epsilon = 1e-9);
        assert_eq!(session.trim().start(), 0.0);
        assert_eq!(session.trim().end(), secs);
        assert_eq!(session.frames().len(), 10);
        assert!(!session.is_recording());
    }

    #[test]
    fn test_start_twice_keeps_recording() {
        let mut session = session();
        session.start_recording();
        session.process_block(&sine(440.0, 2048));
        session.start_recording();
        assert_eq!(session.frames().len(), 1);
    }

    #[test]
    fn test_process_samples_carries_partial_blocks() {
        let mut session = session();
        session.start_recording();
        let samples = sine(440.0, 2048 * 3);

        assert_eq!(session.process_samples(&samples[..1000]), 0);
        assert_eq!(session.process_samples(&samples[1000..3000]), 1);
        assert_eq!(session.process_samples(&samples[3000..]), 2);
        session.stop_recording();

        assert_eq!(session.frames().len(), 3);
        assert_relative_eq!(session.recorded_secs(), 3.0 * 2048.0 / SR, epsilon = 1e-9);
    }

    #[test]
    fn test_convert_and_transpose() {
        let mut session = session();
        session.start_recording();
        for _ in 0..20 {
            session.process_block(&sine(261.63, 2048));
        }
        session.stop_recording();

        let notes = session.convert().unwrap().to_vec();
        assert!(!notes.is_empty());
        assert!(notes.iter().all(|n| n.midi == 60));

        session.octave_up();
        assert!(session.notes().iter().all(|n| n.midi == 72));
        session.transpose(24);
        assert!(session.notes().iter().all(|n| n.midi == 84));
    }

    #[test]
    fn test_convert_empty_trim_is_invalid_window() {
        let mut session = session();
        assert!(matches!(
            session.convert(),
            Err(Error::Transcribe(TranscribeError::InvalidWindow { .. }))
        ));
    }

    #[test]
    fn test_convert_silence_keeps_previous_notes() {
        let mut session = session();
        session.start_recording();
        for _ in 0..10 {
            session.process_block(&sine(261.63, 2048));
        }
        session.stop_recording();
        let before = session.convert().unwrap().len();

        session.start_recording();
        for _ in 0..10 {
            session.process_block(&vec![0.0; 2048]);
        }
        session.stop_recording();

        assert!(matches!(
            session.convert(),
            Err(Error::Transcribe(TranscribeError::NoDataInWindow { .. }))
        ));
        assert_eq!(session.notes().len(), before);
    }

    #[test]
    fn test_convert_window_with_far_end() {
        let mut session = session();
        session.start_recording();
        for _ in 0..10 {
            session.process_block(&sine(261.63, 2048));
        }
        session.stop_recording();

        let notes = session.convert_window(0.0, 1.0e13).unwrap().to_vec();
        assert!(!notes.is_empty());
        assert!(notes.iter().all(|n| n.end() <= session.recorded_secs() + 0.125));
    }

    #[test]
    fn test_set_pitch_range_validates() {
        let mut session = session();
        assert!(session.set_pitch_range(60, 48).is_err());
        assert_eq!(session.pitch_range(), (36, 84));
        session.set_pitch_range(48, 72).unwrap();
        assert_eq!(session.pitch_range(), (48, 72));
    }

    #[test]
    fn test_export_uses_clamped_bpm() {
        let mut session = session();
        session.set_bpm(1000.0);
        assert_eq!(session.bpm(), 220.0);

        let bytes = session.export_midi().unwrap();
        // 60e6 / 220 = 272727 = 0x042957
        let tempo = [0xFF, 0x51, 0x03, 0x04, 0x29, 0x57];
        assert!(bytes.windows(6).any(|w| w == tempo));
    }

    #[test]
    fn test_write_midi_refuses_empty_composition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mid");

        assert!(matches!(
            session().write_midi(&path),
            Err(Error::EmptyComposition)
        ));
        assert!(!path.exists());
    }

    #[cfg(feature = "live")]
    #[test]
    fn test_live_capture_feeds_trace() {
        use ringbuf::{traits::Producer, traits::Split, HeapRb};

        let mut session = session();
        let (mut prod, cons) = HeapRb::<f32>::new(65536).split();
        session.enable_live_capture(cons).unwrap();
        session.start_recording();

        let samples = sine(440.0, 2048 * 8);
        assert_eq!(prod.push_slice(&samples), samples.len());
        std::thread::sleep(std::time::Duration::from_millis(300));

        let secs = session.stop_recording();
        session.disable_live_capture();

        assert_eq!(session.frames().len(), 8);
        assert_relative_eq!(secs, 8.0 * 2048.0 / SR, epsilon = 1e-9);
        assert_eq!(session.latest_pitch().midi_note, Some(69));
    }
}

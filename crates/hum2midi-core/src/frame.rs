//! Timestamped pitch estimates.

/// One pitch estimate produced by the capture loop.
///
/// `t` is seconds since the recording started. Frames are immutable once
/// appended to a trace.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PitchFrame {
    /// Seconds since recording start (non-decreasing along a trace)
    pub t: f64,
    /// Estimated fundamental frequency in Hz
    pub freq_hz: f64,
    /// Nearest MIDI note number (may lie outside 0-127 for extreme input)
    pub midi: i32,
}

impl PitchFrame {
    /// Build a frame from a frequency estimate, deriving the MIDI number.
    pub fn from_frequency(t: f64, freq_hz: f64) -> Self {
        Self {
            t,
            freq_hz,
            midi: crate::hz_to_midi(freq_hz),
        }
    }

    /// Whether the frame's MIDI number lies inside `[floor, ceiling]`.
    pub fn in_pitch_range(&self, floor: u8, ceiling: u8) -> bool {
        self.midi >= floor as i32 && self.midi <= ceiling as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_frequency() {
        let frame = PitchFrame::from_frequency(0.5, 440.0);
        assert_eq!(frame.midi, 69);
        assert_eq!(frame.t, 0.5);
    }

    #[test]
    fn test_in_pitch_range_is_inclusive() {
        let frame = PitchFrame::from_frequency(0.0, 261.63);
        assert_eq!(frame.midi, 60);
        assert!(frame.in_pitch_range(60, 60));
        assert!(frame.in_pitch_range(36, 84));
        assert!(!frame.in_pitch_range(61, 84));
        assert!(!frame.in_pitch_range(36, 59));
    }
}

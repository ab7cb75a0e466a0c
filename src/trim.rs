//! The conversion window chosen after a recording.

/// `[start, end]` in seconds, relative to recording start.
///
/// Both ends stay inside `[0, max]`, where `max` is the recorded duration, and
/// `start <= end` always holds. Each setter resolves a conflict by moving the
/// value being set, never the other end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRange {
    start: f64,
    end: f64,
    max: f64,
}

impl Default for TrimRange {
    fn default() -> Self {
        Self::full(0.0)
    }
}

impl TrimRange {
    /// The whole of a recording lasting `max` seconds.
    pub fn full(max: f64) -> Self {
        let max = sanitize(max);
        Self {
            start: 0.0,
            end: max,
            max,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Upper bound for both ends (the recorded duration).
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    /// A zero-length range cannot be converted.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Move the start. A start past the end is pulled back to the end.
    pub fn set_start(&mut self, start: f64) {
        self.start = sanitize(start).min(self.max).min(self.end);
    }

    /// Move the end. An end before the start is pulled up to the start.
    pub fn set_end(&mut self, end: f64) {
        self.end = sanitize(end).min(self.max).max(self.start);
    }
}

fn sanitize(secs: f64) -> f64 {
    if secs.is_finite() {
        secs.max(0.0)
    } else {
        0.0
    }
}

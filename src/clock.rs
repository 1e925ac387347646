//! Clock sampling against an external, read-only playback position.

/// Anything that can report a playback position. The engine never seeks it.
pub trait ClockSource {
    /// Current position in ms, or `None` while the source is not ready yet
    /// (e.g. the media element has not been mounted).
    fn position_ms(&self) -> Option<f64>;

    fn has_ended(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockSample {
    /// Source unavailable this frame; nothing should change.
    Unavailable,
    Position(f64),
    /// Terminal: the track finished.
    Ended,
}

/// Reads a [`ClockSource`] once per frame and latches end-of-track.
#[derive(Debug, Default)]
pub struct ClockSampler {
    ended: bool,
}

impl ClockSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Once `Ended` has been returned the source is never read again.
    pub fn sample(&mut self, source: &dyn ClockSource) -> ClockSample {
        if self.ended {
            return ClockSample::Ended;
        }
        if source.has_ended() {
            self.ended = true;
            return ClockSample::Ended;
        }
        match source.position_ms() {
            Some(ms) if ms.is_finite() => ClockSample::Position(ms),
            _ => ClockSample::Unavailable,
        }
    }

    pub fn reset(&mut self) {
        self.ended = false;
    }
}

/// Clock whose position is set by hand. Used by native hosts and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManualClock {
    pub position: Option<f64>,
    pub ended: bool,
}

impl ManualClock {
    pub fn at(ms: f64) -> Self {
        Self { position: Some(ms), ended: false }
    }

    pub fn set(&mut self, ms: f64) {
        self.position = Some(ms);
    }

    pub fn finish(&mut self) {
        self.ended = true;
    }
}

impl ClockSource for ManualClock {
    fn position_ms(&self) -> Option<f64> {
        self.position
    }

    fn has_ended(&self) -> bool {
        self.ended
    }
}

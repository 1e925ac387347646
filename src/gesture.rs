//! Normalized gestures. The input boundary turns touch / mouse events into one
//! of these; judging code never sees platform event objects.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Tap,
    Swipe,
}

/// `x`/`y` is where the gesture started, `dy` the vertical travel (screen
/// coordinates, so an upward drag has negative `dy`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub x: f64,
    pub y: f64,
    pub dy: f64,
}

/// What a gesture means for the judge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureIntent {
    Tap,
    Call,
}

impl Gesture {
    pub fn tap(x: f64, y: f64) -> Self {
        Self { kind: GestureKind::Tap, x, y, dy: 0.0 }
    }

    pub fn swipe(start: (f64, f64), end: (f64, f64)) -> Self {
        Self { kind: GestureKind::Swipe, x: start.0, y: start.1, dy: end.1 - start.1 }
    }

    /// Upward travel beyond `threshold_px` is a call, everything else is a tap.
    /// Instruments without swipe calls always tap.
    pub fn intent(&self, threshold_px: f64, swipe_calls: bool) -> GestureIntent {
        if swipe_calls && self.kind == GestureKind::Swipe && -self.dy > threshold_px {
            GestureIntent::Call
        } else {
            GestureIntent::Tap
        }
    }
}

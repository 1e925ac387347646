//! Judgment buckets and hit-window classification.

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Judgment {
    Perfect,
    Great,
    Good,
    Miss,
}

impl Judgment {
    pub fn as_str(self) -> &'static str {
        match self {
            Judgment::Perfect => "perfect",
            Judgment::Great => "great",
            Judgment::Good => "good",
            Judgment::Miss => "miss",
        }
    }
}

/// Acceptance half-widths in milliseconds, narrowest first.
///
/// `good` is also the miss grace period: a pending note expires once the clock
/// is strictly past `time + good`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct JudgeWindows {
    pub perfect: f64,
    pub great: f64,
    pub good: f64,
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self { perfect: 50.0, great: 100.0, good: 150.0 }
    }
}

impl JudgeWindows {
    pub fn is_nested(&self) -> bool {
        0.0 <= self.perfect && self.perfect < self.great && self.great < self.good
    }

    /// Classifies an absolute timing error. `None` means outside every window.
    pub fn classify(&self, diff_ms: f64) -> Option<Judgment> {
        let diff = diff_ms.abs();
        if diff <= self.perfect {
            Some(Judgment::Perfect)
        } else if diff <= self.great {
            Some(Judgment::Great)
        } else if diff <= self.good {
            Some(Judgment::Good)
        } else {
            None
        }
    }

    /// True once a note at `note_time` can no longer be hit at `now`.
    pub fn is_expired(&self, note_time: f64, now: f64) -> bool {
        note_time + self.good < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0 => Some(Judgment::Perfect); "exact")]
    #[test_case(50.0 => Some(Judgment::Perfect); "perfect edge")]
    #[test_case(-50.0 => Some(Judgment::Perfect); "early perfect edge")]
    #[test_case(51.0 => Some(Judgment::Great); "just past perfect")]
    #[test_case(100.0 => Some(Judgment::Great); "great edge")]
    #[test_case(101.0 => Some(Judgment::Good); "just past great")]
    #[test_case(-150.0 => Some(Judgment::Good); "early good edge")]
    #[test_case(151.0 => None; "outside good")]
    fn classify_default_windows(diff: f64) -> Option<Judgment> {
        JudgeWindows::default().classify(diff)
    }

    #[test]
    fn nesting_must_be_strict() {
        assert!(JudgeWindows::default().is_nested());
        assert!(!JudgeWindows { perfect: 50.0, great: 50.0, good: 150.0 }.is_nested());
        assert!(!JudgeWindows { perfect: -1.0, great: 50.0, good: 150.0 }.is_nested());
    }

    #[test]
    fn expiry_is_strictly_after_good_window() {
        let w = JudgeWindows::default();
        assert!(!w.is_expired(1000.0, 1150.0));
        assert!(w.is_expired(1000.0, 1150.5));
    }
}

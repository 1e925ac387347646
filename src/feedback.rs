//! Haptic / visual pulse requests. The engine only names the pulse; the host
//! decides how to render or vibrate it.

use crate::judgment::Judgment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    HitPerfect,
    HitGreat,
    HitGood,
    Miss,
    Call,
}

impl FeedbackKind {
    pub fn for_judgment(judgment: Judgment) -> Self {
        match judgment {
            Judgment::Perfect => FeedbackKind::HitPerfect,
            Judgment::Great => FeedbackKind::HitGreat,
            Judgment::Good => FeedbackKind::HitGood,
            Judgment::Miss => FeedbackKind::Miss,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackKind::HitPerfect => "hit:perfect",
            FeedbackKind::HitGreat => "hit:great",
            FeedbackKind::HitGood => "hit:good",
            FeedbackKind::Miss => "miss",
            FeedbackKind::Call => "call",
        }
    }

    /// Vibration pattern in ms (on, off, on, ...). Hit pulses shrink with
    /// judgment quality; miss is a separate double buzz.
    pub fn vibration_pattern(self) -> &'static [u32] {
        match self {
            FeedbackKind::HitPerfect => &[40],
            FeedbackKind::HitGreat => &[25],
            FeedbackKind::HitGood => &[12],
            FeedbackKind::Miss => &[60, 40, 60],
            FeedbackKind::Call => &[20, 30, 20],
        }
    }
}

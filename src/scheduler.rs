//! Note scheduler: per-note hit state, lazy miss expiry and the render window.

use serde::Serialize;

use crate::chart::{Chart, Note, NoteKind};
use crate::judgment::{JudgeWindows, Judgment};

/// Mutable state for one chart note. `id` is the note's index in the chart.
///
/// A note is hit exactly when it carries a judgment, so `hit` and `judgment`
/// cannot disagree, and once set the judgment is never overwritten.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteState {
    pub id: usize,
    pub note: Note,
    judgment: Option<Judgment>,
}

impl NoteState {
    fn new(id: usize, note: Note) -> Self {
        Self { id, note, judgment: None }
    }

    pub fn is_hit(&self) -> bool {
        self.judgment.is_some()
    }

    pub fn judgment(&self) -> Option<Judgment> {
        self.judgment
    }

    /// pending -> hit. Returns false (and changes nothing) if already resolved.
    fn resolve(&mut self, judgment: Judgment) -> bool {
        if self.judgment.is_some() {
            return false;
        }
        self.judgment = Some(judgment);
        true
    }
}

/// A pending note inside the approach window, ready for the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleNote {
    pub id: usize,
    pub lane: u8,
    pub kind: NoteKind,
    /// Negative once the note is past its hit time.
    pub time_until_hit: f64,
    /// 0.0 when the note enters the approach window, 1.0 at (and after) its hit time.
    pub progress: f64,
}

/// Nearest pending note to a timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub id: usize,
    pub kind: NoteKind,
    pub diff_ms: f64,
}

#[derive(Clone, Debug, Default)]
pub struct NoteScheduler {
    notes: Vec<NoteState>,
}

impl NoteScheduler {
    pub fn new(chart: &Chart) -> Self {
        let notes = chart.notes().iter().enumerate().map(|(id, n)| NoteState::new(id, *n)).collect();
        Self { notes }
    }

    pub fn notes(&self) -> &[NoteState] {
        &self.notes
    }

    pub fn get(&self, id: usize) -> Option<&NoteState> {
        self.notes.get(id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &NoteState> + '_ {
        self.notes.iter().filter(|n| !n.is_hit())
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    pub fn all_resolved(&self) -> bool {
        self.notes.iter().all(NoteState::is_hit)
    }

    /// Expires every pending note whose good window closed before `now`.
    /// Returns the size of the batch; the caller reacts once per non-empty batch.
    pub fn advance(&mut self, now: f64, windows: &JudgeWindows) -> usize {
        let mut expired = 0;
        for state in self.notes.iter_mut().filter(|n| !n.is_hit()) {
            if windows.is_expired(state.note.time, now) && state.resolve(Judgment::Miss) {
                expired += 1;
            }
        }
        expired
    }

    /// Pending notes whose time-until-hit lies in `(-grace_ms, approach_ms]`.
    /// Pure: calling it never touches hit state.
    pub fn visible_notes(
        &self,
        now: f64,
        approach_ms: f64,
        grace_ms: f64,
    ) -> impl Iterator<Item = VisibleNote> + '_ {
        self.pending().filter_map(move |state| {
            let time_until_hit = state.note.time - now;
            if time_until_hit <= -grace_ms || time_until_hit > approach_ms {
                return None;
            }
            Some(VisibleNote {
                id: state.id,
                lane: state.note.lane,
                kind: state.note.kind,
                time_until_hit,
                progress: render_progress(time_until_hit, approach_ms),
            })
        })
    }

    /// Pending note closest to `now` within `max_diff_ms`. Ties keep the first
    /// note in chart order.
    pub fn nearest_pending(&self, now: f64, max_diff_ms: f64) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for state in self.pending() {
            let diff_ms = (state.note.time - now).abs();
            if diff_ms > max_diff_ms {
                continue;
            }
            if best.is_some_and(|b| b.diff_ms <= diff_ms) {
                continue;
            }
            best = Some(Candidate { id: state.id, kind: state.note.kind, diff_ms });
        }
        best
    }

    /// Records an earned judgment. False if the id is unknown or already resolved.
    pub fn resolve(&mut self, id: usize, judgment: Judgment) -> bool {
        self.notes.get_mut(id).is_some_and(|n| n.resolve(judgment))
    }

    pub fn reset(&mut self) {
        for state in &mut self.notes {
            state.judgment = None;
        }
    }
}

/// `1 - time_until_hit / approach_ms`, clamped to `0.0..=1.0`.
pub fn render_progress(time_until_hit: f64, approach_ms: f64) -> f64 {
    if approach_ms <= 0.0 {
        return 1.0;
    }
    (1.0 - time_until_hit / approach_ms).clamp(0.0, 1.0)
}

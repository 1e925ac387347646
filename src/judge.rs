//! Input judge: resolves a tap against the nearest pending note, scores it with
//! the combo multiplier, and runs the call economy.

use crate::calls::{Call, CallCatalog, CallCursor};
use crate::config::SessionConfig;
use crate::judgment::Judgment;
use crate::scheduler::NoteScheduler;

/// Score, streak and spendable currency for one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    /// Spendable; calls draw from it.
    pub score: u64,
    /// Everything ever earned; spending never lowers it.
    pub total_score: u64,
    pub combo: u32,
    pub max_combo: u32,
}

impl ScoreBoard {
    fn record_hit(&mut self, points: u64, new_combo: u32) {
        self.score += points;
        self.total_score += points;
        self.combo = new_combo;
        self.max_combo = self.max_combo.max(new_combo);
    }

    /// Returns true if the streak actually changed.
    pub fn break_combo(&mut self) -> bool {
        let changed = self.combo != 0;
        self.combo = 0;
        changed
    }

    /// Deducts `cost` if affordable. Score never goes below zero.
    pub fn spend(&mut self, cost: u64) -> bool {
        match self.score.checked_sub(cost) {
            Some(rest) => {
                self.score = rest;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A tap that landed on a note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub note_id: usize,
    pub judgment: Judgment,
    pub diff_ms: f64,
    pub points: u64,
    pub combo: u32,
}

/// Judges a tap at `now`. `None` when no pending note sits inside the good
/// window; nothing changes in that case.
pub fn resolve_tap(
    scheduler: &mut NoteScheduler,
    board: &mut ScoreBoard,
    config: &SessionConfig,
    now: f64,
) -> Option<Hit> {
    let candidate = scheduler.nearest_pending(now, config.windows.good)?;
    let judgment = config.windows.classify(candidate.diff_ms)?;
    let new_combo = board.combo + 1;
    let points = config.scoring.points(candidate.kind, judgment, new_combo);
    if !scheduler.resolve(candidate.id, judgment) {
        return None;
    }
    board.record_hit(points, new_combo);
    Some(Hit { note_id: candidate.id, judgment, diff_ms: candidate.diff_ms, points, combo: new_combo })
}

/// Fires the call under the round-robin cursor, if any call is affordable.
pub fn fire_next_call(
    catalog: &CallCatalog,
    cursor: &mut CallCursor,
    board: &mut ScoreBoard,
) -> Option<Call> {
    let affordable = catalog.affordable(board.score).count();
    let call = cursor.select(catalog, board.score)?.clone();
    if !board.spend(call.cost) {
        return None;
    }
    cursor.advance(affordable);
    Some(call)
}

/// Fires a named call. Unknown ids and unaffordable calls are rejected.
pub fn fire_call(catalog: &CallCatalog, id: &str, board: &mut ScoreBoard) -> Option<Call> {
    let call = catalog.find(id)?;
    board.spend(call.cost).then(|| call.clone())
}

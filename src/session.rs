//! Rhythm session: one live instance per played chart.
//!
//! All mutation happens synchronously from two entry points, a per-frame
//! [`Session::tick`] and a gesture ([`Session::handle_gesture`] /
//! [`Session::activate_call`]). Within a frame the host must tick before it
//! forwards that frame's gestures, so a note that expires this frame can never
//! also be hit this frame.
//!
//! Outward notifications (score changes, feedback pulses, calls, end of track)
//! are queued as [`SessionEvent`]s and drained by the host after it is done
//! borrowing the session.

use std::mem;

use log::{debug, info, trace, warn};
use serde::Serialize;

use crate::calls::{Call, CallCatalog, CallCursor, CallMode};
use crate::chart::Chart;
use crate::clock::{ClockSample, ClockSampler, ClockSource};
use crate::config::SessionConfig;
use crate::feedback::FeedbackKind;
use crate::gesture::{Gesture, GestureIntent};
use crate::instrument::Instrument;
use crate::judge::{self, Hit, ScoreBoard};
use crate::judgment::Judgment;
use crate::scheduler::{NoteScheduler, NoteState, VisibleNote};

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    ScoreChanged { total_score: u64, combo: u32 },
    Feedback(FeedbackKind),
    CallFired { call: Call, remaining_score: u64 },
    /// Emitted exactly once, when the clock reports end-of-track.
    Ended(ResultSummary),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock not available this frame; nothing changed.
    Skipped,
    Advanced { expired: usize },
    /// Track just ended; the host should stop scheduling frames.
    Ended,
    /// Session already over; the clock was not read.
    Stopped,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    Ignored,
    Hit(Hit),
    Call(Call),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallOutcome {
    Fired(Call),
    Rejected,
}

/// Final tally, also available mid-song.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub total_score: u64,
    pub max_combo: u32,
    pub perfect: usize,
    pub great: usize,
    pub good: usize,
    pub miss: usize,
    pub pending: usize,
    /// Share of resolved notes that were hit (0.0 when nothing resolved yet).
    pub hit_rate: f64,
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    instrument: Instrument,
    lanes: u8,
    catalog: CallCatalog,
    scheduler: NoteScheduler,
    sampler: ClockSampler,
    board: ScoreBoard,
    cursor: CallCursor,
    current_time: f64,
    /// False until the clock has produced a position; gestures wait for it.
    sampled: bool,
    ended: bool,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(chart: &Chart, config: SessionConfig, instrument: Instrument, catalog: CallCatalog) -> Self {
        info!(
            "session start: {} notes, instrument {}, {} calls",
            chart.len(),
            instrument,
            catalog.calls().len()
        );
        if chart.lane_count() > instrument.lane_count() {
            warn!("chart uses {} lanes, {} has {}", chart.lane_count(), instrument, instrument.lane_count());
        }
        Self {
            config,
            instrument,
            lanes: chart.lane_count().max(instrument.lane_count()),
            catalog,
            scheduler: NoteScheduler::new(chart),
            sampler: ClockSampler::new(),
            board: ScoreBoard::default(),
            cursor: CallCursor::default(),
            current_time: 0.0,
            sampled: false,
            ended: false,
            events: Vec::new(),
        }
    }

    /// Samples the clock once and expires overdue notes.
    pub fn tick(&mut self, clock: &dyn ClockSource) -> TickOutcome {
        if self.ended {
            return TickOutcome::Stopped;
        }
        match self.sampler.sample(clock) {
            ClockSample::Unavailable => TickOutcome::Skipped,
            ClockSample::Ended => {
                self.finish();
                TickOutcome::Ended
            }
            ClockSample::Position(ms) => self.advance_to(ms),
        }
    }

    /// Moves the session clock to `ms` (never backwards) and expires notes
    /// whose good window has closed.
    pub fn advance_to(&mut self, ms: f64) -> TickOutcome {
        if self.ended {
            return TickOutcome::Stopped;
        }
        if !self.sampled || ms > self.current_time {
            self.current_time = ms;
        }
        self.sampled = true;
        let expired = self.scheduler.advance(self.current_time, &self.config.windows);
        if expired > 0 {
            trace!("{expired} note(s) missed at {:.1}ms", self.current_time);
            self.events.push(SessionEvent::Feedback(FeedbackKind::Miss));
            if self.board.break_combo() {
                self.push_score_changed();
            }
        }
        TickOutcome::Advanced { expired }
    }

    pub fn handle_gesture(&mut self, gesture: Gesture) -> GestureOutcome {
        if self.ended {
            return GestureOutcome::Ignored;
        }
        if !self.sampled {
            trace!("gesture before first clock sample ignored");
            return GestureOutcome::Ignored;
        }
        match gesture.intent(self.config.swipe_threshold_px, self.instrument.swipe_calls()) {
            GestureIntent::Call => match judge::fire_next_call(&self.catalog, &mut self.cursor, &mut self.board) {
                Some(call) => {
                    self.push_call(&call);
                    GestureOutcome::Call(call)
                }
                None => {
                    debug!("swipe call ignored: nothing affordable with score {}", self.board.score);
                    GestureOutcome::Ignored
                }
            },
            GestureIntent::Tap => {
                match judge::resolve_tap(&mut self.scheduler, &mut self.board, &self.config, self.current_time) {
                    Some(hit) => {
                        debug!(
                            "note {} {} ({:.1}ms off) +{} combo {}",
                            hit.note_id,
                            hit.judgment.as_str(),
                            hit.diff_ms,
                            hit.points,
                            hit.combo
                        );
                        self.events.push(SessionEvent::Feedback(FeedbackKind::for_judgment(hit.judgment)));
                        self.push_score_changed();
                        GestureOutcome::Hit(hit)
                    }
                    None => GestureOutcome::Ignored,
                }
            }
        }
    }

    /// Explicit call choice for single-button instruments. Round-robin
    /// instruments only fire calls through swipes.
    pub fn activate_call(&mut self, id: &str) -> CallOutcome {
        if self.ended || self.instrument.call_mode() != CallMode::Explicit {
            return CallOutcome::Rejected;
        }
        match judge::fire_call(&self.catalog, id, &mut self.board) {
            Some(call) => {
                self.push_call(&call);
                CallOutcome::Fired(call)
            }
            None => {
                debug!("call {id} rejected with score {}", self.board.score);
                CallOutcome::Rejected
            }
        }
    }

    /// Back to the top of the chart: every note pending, score and streak cleared.
    pub fn restart(&mut self) {
        info!("session restart");
        self.scheduler.reset();
        self.sampler.reset();
        self.board.reset();
        self.cursor.reset();
        self.current_time = 0.0;
        self.sampled = false;
        self.ended = false;
        self.events.clear();
        self.push_score_changed();
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    pub fn visible_notes(&self) -> impl Iterator<Item = VisibleNote> + '_ {
        self.scheduler
            .visible_notes(self.current_time, self.config.approach_time_ms, self.config.windows.good)
    }

    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary {
            total_score: self.board.total_score,
            max_combo: self.board.max_combo,
            ..Default::default()
        };
        for state in self.scheduler.notes() {
            match state.judgment() {
                Some(Judgment::Perfect) => summary.perfect += 1,
                Some(Judgment::Great) => summary.great += 1,
                Some(Judgment::Good) => summary.good += 1,
                Some(Judgment::Miss) => summary.miss += 1,
                None => summary.pending += 1,
            }
        }
        let hits = summary.perfect + summary.great + summary.good;
        let resolved = hits + summary.miss;
        if resolved > 0 {
            summary.hit_rate = hits as f64 / resolved as f64;
        }
        summary
    }

    pub fn notes(&self) -> &[NoteState] {
        self.scheduler.notes()
    }

    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.board.score
    }

    pub fn total_score(&self) -> u64 {
        self.board.total_score
    }

    pub fn combo(&self) -> u32 {
        self.board.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.board.max_combo
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Lanes the renderer should lay out: the instrument's, widened if the
    /// chart references more.
    pub fn lane_count(&self) -> u8 {
        self.lanes
    }

    pub fn catalog(&self) -> &CallCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn finish(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        let summary = self.summary();
        info!(
            "session end: total {} max combo {} ({}/{}/{}/{} p/gr/gd/miss)",
            summary.total_score, summary.max_combo, summary.perfect, summary.great, summary.good, summary.miss
        );
        self.events.push(SessionEvent::Ended(summary));
    }

    fn push_score_changed(&mut self) {
        self.events.push(SessionEvent::ScoreChanged {
            total_score: self.board.total_score,
            combo: self.board.combo,
        });
    }

    fn push_call(&mut self, call: &Call) {
        debug!("call {} fired, score left {}", call.id, self.board.score);
        self.events.push(SessionEvent::CallFired { call: call.clone(), remaining_score: self.board.score });
        self.events.push(SessionEvent::Feedback(FeedbackKind::Call));
    }
}

//! Chart data: the immutable list of timed notes for one song / instrument.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Note discriminator. Special notes award more base points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    #[default]
    Normal,
    Special,
}

/// One chart entry. `time` is milliseconds from track start.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Note {
    pub time: f64,
    #[serde(default)]
    pub lane: u8,
    #[serde(rename = "type", default)]
    pub kind: NoteKind,
}

impl Note {
    pub fn normal(time: f64) -> Self {
        Self { time, lane: 0, kind: NoteKind::Normal }
    }

    pub fn special(time: f64) -> Self {
        Self { time, lane: 0, kind: NoteKind::Special }
    }

    pub fn in_lane(mut self, lane: u8) -> Self {
        self.lane = lane;
        self
    }
}

/// Read-only note list shared with a session for its whole lifetime.
///
/// Notes are not validated: negative or unordered times are accepted and simply
/// judge the way their numbers say.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chart {
    notes: Vec<Note>,
}

impl Chart {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Parses `[{"time": 1000, "lane": 1, "type": "special"}, ...]`.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let notes: Vec<Note> = serde_json::from_str(json)?;
        Ok(Self { notes })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Highest lane index referenced by the chart, plus one.
    pub fn lane_count(&self) -> u8 {
        self.notes.iter().map(|n| n.lane.saturating_add(1)).max().unwrap_or(1)
    }
}

impl From<Vec<Note>> for Chart {
    fn from(notes: Vec<Note>) -> Self {
        Self::new(notes)
    }
}

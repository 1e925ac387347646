//! Call catalog and the score economy that pays for calls.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A crowd-response action bought with score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub id: String,
    pub text: String,
    pub icon: String,
    pub cost: u64,
}

impl Call {
    pub fn new(id: &str, text: &str, icon: &str, cost: u64) -> Self {
        Self { id: id.to_owned(), text: text.to_owned(), icon: icon.to_owned(), cost }
    }
}

/// How an instrument picks which call fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallMode {
    /// Swipe-up fires the next affordable call, cycling through them.
    RoundRobin,
    /// The player names the call; swipes are plain taps.
    Explicit,
}

/// Fixed per session; never mutated after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallCatalog {
    calls: Vec<Call>,
}

impl Default for CallCatalog {
    fn default() -> Self {
        Self::new(vec![
            Call::new("hai", "Hai! Hai!", "🙌", 100),
            Call::new("clap", "Clap clap!", "👏", 150),
            Call::new("fufu", "Fu-fu!", "🔥", 200),
            Call::new("love", "Love you!", "💖", 300),
        ])
    }
}

impl CallCatalog {
    pub fn new(calls: Vec<Call>) -> Self {
        Self { calls }
    }

    /// Parses `[{"id": "hai", "text": "Hai!", "icon": "🙌", "cost": 100}, ...]`.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn find(&self, id: &str) -> Option<&Call> {
        self.calls.iter().find(|c| c.id == id)
    }

    /// Calls whose cost fits in `score`, in catalog order.
    pub fn affordable(&self, score: u64) -> impl Iterator<Item = &Call> + '_ {
        self.calls.iter().filter(move |c| c.cost <= score)
    }
}

/// Round-robin position over the currently affordable calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCursor(usize);

impl CallCursor {
    /// Picks the call at the cursor among those affordable at `score`.
    /// Does not move the cursor; see [`CallCursor::advance`].
    pub fn select<'a>(&self, catalog: &'a CallCatalog, score: u64) -> Option<&'a Call> {
        let count = catalog.affordable(score).count();
        if count == 0 {
            return None;
        }
        catalog.affordable(score).nth(self.0 % count)
    }

    /// Steps once after a call fired, modulo the affordable count at firing time.
    pub fn advance(&mut self, affordable_count: usize) {
        if affordable_count > 0 {
            self.0 = (self.0 + 1) % affordable_count;
        }
    }

    pub fn position(&self) -> usize {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

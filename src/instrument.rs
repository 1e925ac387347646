//! Instrument categories. Each one fixes how many lanes it shows and how the
//! player fires calls.

use std::fmt;
use std::str::FromStr;

use crate::calls::CallMode;
use crate::error::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Instrument {
    #[default]
    Guitar,
    Bass,
    Drums,
    Keyboard,
    Vocal,
    Tambourine,
}

impl Instrument {
    pub const ALL: [Instrument; 6] = [
        Instrument::Guitar,
        Instrument::Bass,
        Instrument::Drums,
        Instrument::Keyboard,
        Instrument::Vocal,
        Instrument::Tambourine,
    ];

    pub fn lane_count(self) -> u8 {
        match self {
            Instrument::Guitar => 4,
            Instrument::Bass => 3,
            Instrument::Drums => 4,
            Instrument::Keyboard => 5,
            Instrument::Vocal | Instrument::Tambourine => 1,
        }
    }

    /// Multi-lane instruments cycle calls on swipe-up; single-button ones pick
    /// a call explicitly.
    pub fn call_mode(self) -> CallMode {
        if self.lane_count() > 1 { CallMode::RoundRobin } else { CallMode::Explicit }
    }

    pub fn swipe_calls(self) -> bool {
        self.call_mode() == CallMode::RoundRobin
    }

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Guitar => "guitar",
            Instrument::Bass => "bass",
            Instrument::Drums => "drums",
            Instrument::Keyboard => "keyboard",
            Instrument::Vocal => "vocal",
            Instrument::Tambourine => "tambourine",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instrument {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Instrument::ALL
            .into_iter()
            .find(|i| i.name() == lower)
            .ok_or_else(|| EngineError::UnknownInstrument(s.to_owned()))
    }
}

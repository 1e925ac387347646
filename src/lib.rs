//! Fansa Band core crate.
//!
//! Rhythm-judgment engine for the band / karaoke party game: notes fall toward
//! a hit line in sync with the song, taps are judged against the live audio
//! clock, and score doubles as the currency audience "calls" are bought with.
//! Room, queue and song-search state live in the page and its backing store;
//! only the judgment engine and its browser binding live here.
//!
//! The engine ([`Session`]) is plain Rust and runs on native hosts too; the
//! [`web`] module wires it to a media element and `requestAnimationFrame`.

use wasm_bindgen::prelude::*;

pub mod calls;
pub mod chart;
pub mod clock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod gesture;
pub mod instrument;
pub mod judge;
pub mod judgment;
pub mod logging;
pub mod scheduler;
pub mod session;
pub mod web;

pub use calls::{Call, CallCatalog, CallMode};
pub use chart::{Chart, Note, NoteKind};
pub use clock::{ClockSource, ManualClock};
pub use config::SessionConfig;
pub use error::EngineError;
pub use feedback::FeedbackKind;
pub use gesture::Gesture;
pub use instrument::Instrument;
pub use judgment::{JudgeWindows, Judgment};
pub use session::{CallOutcome, GestureOutcome, ResultSummary, Session, SessionEvent, TickOutcome};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Adjusts console verbosity from the page ("warn", "debug", ...).
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    logging::init(logging::parse_level(level));
}

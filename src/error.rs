//! Errors raised while loading charts, configs and call catalogs.
//!
//! The judgment engine itself never fails; everything that can go wrong happens
//! before a session starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to parse JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("judge windows must nest (0 <= perfect < great < good), got {perfect}/{great}/{good}")]
    WindowsNotNested { perfect: f64, great: f64, good: f64 },

    #[error("invalid combo tiers: {0}")]
    InvalidComboTiers(String),

    #[error("approach time must be positive, got {0}ms")]
    InvalidApproachTime(f64),

    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),
}

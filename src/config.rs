//! Session tuning: judge windows, scoring tables, approach time, swipe threshold.
//!
//! Everything deserializes from camelCase JSON with per-field defaults so a host
//! page only has to send what it overrides, e.g. `{"windows": {"good": 180}}`.

use serde::Deserialize;

use crate::chart::NoteKind;
use crate::error::EngineError;
use crate::judgment::{JudgeWindows, Judgment};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BasePoints {
    pub normal: u32,
    pub special: u32,
}

impl Default for BasePoints {
    fn default() -> Self {
        Self { normal: 100, special: 300 }
    }
}

impl BasePoints {
    pub fn for_kind(&self, kind: NoteKind) -> u32 {
        match kind {
            NoteKind::Normal => self.normal,
            NoteKind::Special => self.special,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct JudgmentMultipliers {
    pub perfect: f64,
    pub great: f64,
    pub good: f64,
}

impl Default for JudgmentMultipliers {
    fn default() -> Self {
        Self { perfect: 1.0, great: 0.8, good: 0.5 }
    }
}

impl JudgmentMultipliers {
    pub fn for_judgment(&self, judgment: Judgment) -> f64 {
        match judgment {
            Judgment::Perfect => self.perfect,
            Judgment::Great => self.great,
            Judgment::Good => self.good,
            Judgment::Miss => 0.0,
        }
    }
}

/// Multiplier applied once the streak reaches `min_combo`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboTier {
    pub min_combo: u32,
    pub multiplier: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    pub base_points: BasePoints,
    pub multipliers: JudgmentMultipliers,
    pub combo_tiers: Vec<ComboTier>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_points: BasePoints::default(),
            multipliers: JudgmentMultipliers::default(),
            combo_tiers: vec![
                ComboTier { min_combo: 0, multiplier: 1.0 },
                ComboTier { min_combo: 20, multiplier: 1.2 },
                ComboTier { min_combo: 50, multiplier: 1.5 },
                ComboTier { min_combo: 100, multiplier: 2.0 },
            ],
        }
    }
}

impl ScoringConfig {
    /// Step function over streak length. Streaks below the first tier score 1x.
    pub fn combo_multiplier(&self, combo: u32) -> f64 {
        self.combo_tiers
            .iter()
            .take_while(|tier| tier.min_combo <= combo)
            .last()
            .map_or(1.0, |tier| tier.multiplier)
    }

    /// `floor(base * judgment multiplier * combo multiplier)`.
    pub fn points(&self, kind: NoteKind, judgment: Judgment, combo: u32) -> u64 {
        let raw = self.base_points.for_kind(kind) as f64
            * self.multipliers.for_judgment(judgment)
            * self.combo_multiplier(combo);
        raw.max(0.0).floor() as u64
    }

    fn validate(&self) -> Result<(), EngineError> {
        for pair in self.combo_tiers.windows(2) {
            if pair[1].min_combo <= pair[0].min_combo {
                return Err(EngineError::InvalidComboTiers(format!(
                    "tier thresholds must increase ({} then {})",
                    pair[0].min_combo, pair[1].min_combo
                )));
            }
            if pair[1].multiplier < pair[0].multiplier {
                return Err(EngineError::InvalidComboTiers(format!(
                    "multiplier drops from {} to {} at combo {}",
                    pair[0].multiplier, pair[1].multiplier, pair[1].min_combo
                )));
            }
        }
        if self.combo_tiers.iter().any(|t| !t.multiplier.is_finite() || t.multiplier < 0.0) {
            return Err(EngineError::InvalidComboTiers("multipliers must be finite and non-negative".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub windows: JudgeWindows,
    pub scoring: ScoringConfig,
    /// How long before its hit time a note becomes visible.
    pub approach_time_ms: f64,
    /// Upward drag distance (logical px) that turns a gesture into a call.
    pub swipe_threshold_px: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            windows: JudgeWindows::default(),
            scoring: ScoringConfig::default(),
            approach_time_ms: 2000.0,
            swipe_threshold_px: 50.0,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let w = self.windows;
        if !w.is_nested() {
            return Err(EngineError::WindowsNotNested { perfect: w.perfect, great: w.great, good: w.good });
        }
        if self.approach_time_ms.is_nan() || self.approach_time_ms <= 0.0 {
            return Err(EngineError::InvalidApproachTime(self.approach_time_ms));
        }
        self.scoring.validate()
    }
}

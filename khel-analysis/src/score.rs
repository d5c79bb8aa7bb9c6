//! Score normalization
//!
//! Maps a raw result onto the 1–10 scale using the exercise's ceiling:
//! `scale(raw, c) = round2(1 + min(max(raw, 0), c) / c × 9)`.
//!
//! Lower-is-better exercises score the margin `c − min(raw, c)` when the
//! attempt completed; an incomplete attempt scores 1 whatever its raw value.

use khel_common::config::ScoringConfig;
use khel_common::{Error, Result};
use std::collections::HashMap;

use crate::models::{ExerciseKind, ScoreDirection};

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 10.0;

/// Map `raw` into [1, 10] against `ceiling`
///
/// # Examples
///
/// ```
/// use khel_analysis::score::scale;
///
/// assert_eq!(scale(0.0, 50.0), 1.0);
/// assert_eq!(scale(25.0, 50.0), 5.5);
/// assert_eq!(scale(80.0, 50.0), 10.0);
/// ```
pub fn scale(raw: f64, ceiling: f64) -> f64 {
    if !(ceiling > 0.0) || !raw.is_finite() {
        return MIN_SCORE;
    }
    let bounded = raw.max(0.0).min(ceiling);
    let scaled = MIN_SCORE + bounded / ceiling * (MAX_SCORE - MIN_SCORE);
    ((scaled * 100.0).round() / 100.0).clamp(MIN_SCORE, MAX_SCORE)
}

/// Per-exercise ceilings with configuration overrides applied
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreNormalizer {
    ceilings: HashMap<ExerciseKind, f64>,
}

impl Default for ScoreNormalizer {
    fn default() -> Self {
        Self {
            ceilings: ExerciseKind::ALL
                .iter()
                .map(|kind| (*kind, kind.default_ceiling()))
                .collect(),
        }
    }
}

impl ScoreNormalizer {
    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        let overrides = [
            (ExerciseKind::PushUps, config.push_ups),
            (ExerciseKind::SitUps, config.sit_ups),
            (ExerciseKind::HighKnees, config.high_knees),
            (ExerciseKind::VerticalJump, config.vertical_jump),
            (ExerciseKind::ShuttleRun, config.shuttle_run),
            (ExerciseKind::Sprint, config.sprint),
        ];

        let mut normalizer = Self::default();
        for (kind, ceiling) in overrides {
            if let Some(value) = ceiling {
                normalizer = normalizer.with_ceiling(kind, value)?;
            }
        }
        Ok(normalizer)
    }

    /// Override one ceiling; non-positive values are rejected
    pub fn with_ceiling(mut self, kind: ExerciseKind, ceiling: f64) -> Result<Self> {
        if !(ceiling > 0.0) {
            return Err(Error::Config(format!(
                "Score ceiling for {} must be positive, got {}",
                kind, ceiling
            )));
        }
        self.ceilings.insert(kind, ceiling);
        Ok(self)
    }

    pub fn ceiling(&self, kind: ExerciseKind) -> f64 {
        self.ceilings
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_ceiling())
    }

    /// Scaled score for a raw result of `kind`
    ///
    /// `complete` is false when a timed attempt never reached its end.
    pub fn normalize(&self, kind: ExerciseKind, raw: f64, complete: bool) -> f64 {
        let ceiling = self.ceiling(kind);
        match kind.direction() {
            ScoreDirection::HigherIsBetter => scale(raw, ceiling),
            ScoreDirection::LowerIsBetter if complete => {
                scale(ceiling - raw.max(0.0).min(ceiling), ceiling)
            }
            ScoreDirection::LowerIsBetter => MIN_SCORE,
        }
    }
}

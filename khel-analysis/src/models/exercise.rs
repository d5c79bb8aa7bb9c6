//! Supported exercises
//!
//! `ExerciseKind` is the entry gate: a name that does not parse is rejected
//! before any frame is read, and every kind carries its own score ceiling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Whether a larger raw result is a better performance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreDirection {
    HigherIsBetter,
    LowerIsBetter,
}

/// Reference an exercise needs before its state machine may count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationNeed {
    None,
    /// Two horizontal positions (lines or markers)
    SpatialPair,
    /// Pixels per centimetre from the athlete's height
    HeightScale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    PushUps,
    SitUps,
    HighKnees,
    VerticalJump,
    ShuttleRun,
    Sprint,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 6] = [
        ExerciseKind::PushUps,
        ExerciseKind::SitUps,
        ExerciseKind::HighKnees,
        ExerciseKind::VerticalJump,
        ExerciseKind::ShuttleRun,
        ExerciseKind::Sprint,
    ];

    /// Display name used by the submissions backend
    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseKind::PushUps => "Push-ups",
            ExerciseKind::SitUps => "Sit-ups",
            ExerciseKind::HighKnees => "Endurance Run",
            ExerciseKind::VerticalJump => "Vertical Jump",
            ExerciseKind::ShuttleRun => "Shuttle Run",
            ExerciseKind::Sprint => "Sprint",
        }
    }

    /// Raw result that maps to a full score of 10
    ///
    /// Reps for the repetition exercises, centimetres for the jump, laps
    /// for the shuttle run and seconds for the sprint.
    pub fn default_ceiling(self) -> f64 {
        match self {
            ExerciseKind::PushUps => 50.0,
            ExerciseKind::SitUps => 50.0,
            ExerciseKind::HighKnees => 100.0,
            ExerciseKind::VerticalJump => 60.0,
            ExerciseKind::ShuttleRun => 10.0,
            ExerciseKind::Sprint => 20.0,
        }
    }

    pub fn direction(self) -> ScoreDirection {
        match self {
            ExerciseKind::Sprint => ScoreDirection::LowerIsBetter,
            _ => ScoreDirection::HigherIsBetter,
        }
    }

    pub fn calibration_need(self) -> CalibrationNeed {
        match self {
            ExerciseKind::VerticalJump => CalibrationNeed::HeightScale,
            ExerciseKind::ShuttleRun => CalibrationNeed::SpatialPair,
            _ => CalibrationNeed::None,
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ExerciseKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "push-ups" | "pushups" | "push_ups" => ExerciseKind::PushUps,
            "sit-ups" | "situps" | "sit_ups" => ExerciseKind::SitUps,
            "endurance run" | "high knees" | "high_knees" => ExerciseKind::HighKnees,
            "vertical jump" | "vertical_jump" => ExerciseKind::VerticalJump,
            "shuttle run" | "shuttle_run" => ExerciseKind::ShuttleRun,
            "sprint" => ExerciseKind::Sprint,
            _ => return Err(AnalysisError::UnsupportedExerciseType(s.to_string())),
        };
        Ok(kind)
    }
}

//! Data models for khel-analysis
//!
//! - Landmark frames from the pose estimator
//! - Exercise catalogue and score ceilings
//! - Events, feedback and the assembled report
//! - Session lifecycle bookkeeping

pub mod event;
pub mod exercise;
pub mod landmark;
pub mod report;
pub mod session;

pub use event::{Event, EventKind, FeedbackCategory, FeedbackEntry, Step};
pub use exercise::{CalibrationNeed, ExerciseKind, ScoreDirection};
pub use landmark::{BodyLandmark, Landmark, LandmarkFrame};
pub use report::{AnalysisReport, ExerciseMetrics, ScoredResult, SprintStatus, OPEN_FAILURE_MESSAGE};
pub use session::{PhaseTransition, SessionPhase, SessionRecord};

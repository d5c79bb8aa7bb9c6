//! Exercise analyzers
//!
//! Every exercise implements [`ExerciseAnalyzer`]. Repetition exercises are
//! thin wrappers around the shared [`hysteresis`] engine; jump, shuttle run
//! and sprint track positions directly.
//!
//! Frames reach an analyzer only after any required calibration resolved.

pub mod high_knees;
pub mod hysteresis;
pub mod pushups;
pub mod shuttle_run;
pub mod situps;
pub mod sprint;
pub mod vertical_jump;

use crate::accumulator::{EventAccumulator, FeedbackLog};
use crate::calibration::CalibrationReference;
use crate::config::AnalysisSettings;
use crate::geometry::{to_pixel, Point2};
use crate::models::{BodyLandmark, ExerciseKind, ExerciseMetrics, Landmark, LandmarkFrame, Step};

/// Everything an analyzer may look at for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub landmarks: &'a LandmarkFrame,
    pub width: u32,
    pub height: u32,
    pub visibility_threshold: f64,
    pub reference: Option<&'a CalibrationReference>,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&self) -> u64 {
        self.landmarks.index
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.landmarks.timestamp_ms
    }

    /// Normalized landmark if visible enough
    pub fn visible(&self, id: BodyLandmark) -> Option<&'a Landmark> {
        self.landmarks.visible(id, self.visibility_threshold)
    }

    /// Normalized point if visible enough
    pub fn point(&self, id: BodyLandmark) -> Option<Point2> {
        self.visible(id).map(|lm| Point2::new(lm.x, lm.y))
    }

    /// Pixel-space point if visible enough
    pub fn pixel(&self, id: BodyLandmark) -> Option<Point2> {
        self.visible(id).map(|lm| to_pixel(lm, self.width, self.height))
    }
}

pub trait ExerciseAnalyzer: Send {
    fn kind(&self) -> ExerciseKind;

    /// Process one frame; one `Step` per state machine that reacted
    fn observe(&mut self, ctx: &FrameContext<'_>) -> Vec<Step>;

    /// End of stream; emits events that need the whole session
    fn finish(&mut self, _last_frame: u64) -> Vec<Step> {
        Vec::new()
    }

    fn metrics(&self, acc: &EventAccumulator) -> ExerciseMetrics;

    /// Raw result in the unit of the exercise's ceiling, never negative
    fn raw_score(&self, acc: &EventAccumulator) -> f64;

    fn summary(&self, acc: &EventAccumulator, feedback: &FeedbackLog) -> String;
}

/// Analyzer for `kind`, configured from the service settings
pub fn build_analyzer(kind: ExerciseKind, settings: &AnalysisSettings) -> Box<dyn ExerciseAnalyzer> {
    match kind {
        ExerciseKind::PushUps => Box::new(pushups::PushUpAnalyzer::new()),
        ExerciseKind::SitUps => Box::new(situps::SitUpAnalyzer::new()),
        ExerciseKind::HighKnees => Box::new(high_knees::HighKneesAnalyzer::new()),
        ExerciseKind::VerticalJump => {
            Box::new(vertical_jump::VerticalJumpAnalyzer::new(settings.explosive_jump_cm))
        }
        ExerciseKind::ShuttleRun => {
            Box::new(shuttle_run::ShuttleRunAnalyzer::new(settings.shuttle_estimator.build()))
        }
        ExerciseKind::Sprint => Box::new(sprint::SprintAnalyzer::new(
            settings.sprint_start_x,
            settings.sprint_finish_x,
        )),
    }
}

/// Wrap a single step, dropping it when nothing happened
pub(crate) fn single(step: Step) -> Vec<Step> {
    if step.is_empty() {
        Vec::new()
    } else {
        vec![step]
    }
}

/// Repetition metrics shared by the rep-counting exercises
pub(crate) fn rep_metrics(acc: &EventAccumulator) -> ExerciseMetrics {
    ExerciseMetrics::Reps {
        total_reps: acc.reps(),
        incomplete_reps: acc.incomplete_reps(),
    }
}

//! Shuttle run: lap counting between two references
//!
//! The nose x position, in pixels and passed through the configured
//! position estimator, is compared with the resolved left/right references.
//! Reaching a reference other than the current side toggles the state and
//! counts one lap; the first reference reached from `Outside` opens the run
//! and counts as well.

use super::{single, ExerciseAnalyzer, FrameContext};
use crate::accumulator::{EventAccumulator, FeedbackLog};
use crate::geometry::Point2;
use crate::models::{BodyLandmark, EventKind, ExerciseKind, ExerciseMetrics, Step};
use crate::tracking::PositionEstimator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuttleState {
    Outside,
    AtLeft,
    AtRight,
}

/// Lap state machine over horizontal positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapCounter {
    left_x: f64,
    right_x: f64,
    state: ShuttleState,
    laps: u32,
}

impl LapCounter {
    pub fn new(left_x: f64, right_x: f64) -> Self {
        Self {
            left_x,
            right_x,
            state: ShuttleState::Outside,
            laps: 0,
        }
    }

    pub fn state(&self) -> ShuttleState {
        self.state
    }

    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// Advance on one position; returns the new side when a lap completes
    pub fn observe(&mut self, x: f64) -> Option<ShuttleState> {
        let reached = if x <= self.left_x {
            ShuttleState::AtLeft
        } else if x >= self.right_x {
            ShuttleState::AtRight
        } else {
            return None;
        };

        if reached == self.state {
            return None;
        }
        self.state = reached;
        self.laps += 1;
        Some(reached)
    }
}

pub struct ShuttleRunAnalyzer {
    estimator: Box<dyn PositionEstimator>,
    counter: Option<LapCounter>,
}

impl ShuttleRunAnalyzer {
    pub fn new(estimator: Box<dyn PositionEstimator>) -> Self {
        Self {
            estimator,
            counter: None,
        }
    }
}

impl ExerciseAnalyzer for ShuttleRunAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::ShuttleRun
    }

    fn observe(&mut self, ctx: &FrameContext<'_>) -> Vec<Step> {
        if self.counter.is_none() {
            let Some((left_x, right_x)) = ctx.reference.and_then(|r| r.horizontal_pair()) else {
                return Vec::new();
            };
            self.counter = Some(LapCounter::new(left_x, right_x));
        }

        let Some(nose) = ctx.pixel(BodyLandmark::Nose) else {
            return Vec::new();
        };
        let position: Point2 = self.estimator.estimate(nose);

        let Some(counter) = self.counter.as_mut() else {
            return Vec::new();
        };
        let frame = ctx.frame();
        let step = match counter.observe(position.x) {
            Some(side) => {
                let mut step = Step::with_event(EventKind::Lap, frame, position.x);
                match side {
                    ShuttleState::AtLeft => step.strength("Quick turnaround to left side", frame),
                    _ => step.strength("Quick turnaround to right side", frame),
                }
                step
            }
            None => Step::none(),
        };
        single(step)
    }

    fn metrics(&self, acc: &EventAccumulator) -> ExerciseMetrics {
        ExerciseMetrics::Laps { laps: acc.laps() }
    }

    fn raw_score(&self, acc: &EventAccumulator) -> f64 {
        f64::from(acc.laps())
    }

    fn summary(&self, acc: &EventAccumulator, _feedback: &FeedbackLog) -> String {
        format!("Completed {} laps with shuttle run feedback.", acc.laps())
    }
}

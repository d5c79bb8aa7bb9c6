//! Sprint: timing between two fixed pixel lines
//!
//! READY → RUNNING when the right shoulder passes the start line,
//! RUNNING → FINISHED when it passes the finish line. Elapsed time comes from
//! frame timestamps, so analysis speed never affects the result.

use super::{single, ExerciseAnalyzer, FrameContext};
use crate::accumulator::{EventAccumulator, FeedbackLog};
use crate::models::{BodyLandmark, EventKind, ExerciseKind, ExerciseMetrics, SprintStatus, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintState {
    Ready,
    /// Start timestamp in milliseconds
    Running(u64),
    Finished,
}

pub struct SprintAnalyzer {
    start_x: f64,
    finish_x: f64,
    state: SprintState,
}

impl SprintAnalyzer {
    pub fn new(start_x: f64, finish_x: f64) -> Self {
        Self {
            start_x,
            finish_x,
            state: SprintState::Ready,
        }
    }

    pub fn state(&self) -> SprintState {
        self.state
    }
}

impl ExerciseAnalyzer for SprintAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Sprint
    }

    fn observe(&mut self, ctx: &FrameContext<'_>) -> Vec<Step> {
        let Some(shoulder) = ctx.pixel(BodyLandmark::RightShoulder) else {
            return Vec::new();
        };

        match self.state {
            SprintState::Ready if shoulder.x > self.start_x => {
                tracing::debug!(frame = ctx.frame(), "Sprint started");
                self.state = SprintState::Running(ctx.timestamp_ms());
                Vec::new()
            }
            SprintState::Running(started) if shoulder.x > self.finish_x => {
                self.state = SprintState::Finished;
                let elapsed_ms = ctx.timestamp_ms().saturating_sub(started);
                let seconds = (elapsed_ms as f64 / 1000.0 * 100.0).round() / 100.0;
                single(Step::with_event(EventKind::SplitTime, ctx.frame(), seconds))
            }
            _ => Vec::new(),
        }
    }

    fn finish(&mut self, last_frame: u64) -> Vec<Step> {
        if self.state == SprintState::Finished {
            return Vec::new();
        }
        let mut step = Step::none();
        step.mistake("Incomplete run", last_frame);
        step.tip("Keep driving through the finish line", last_frame);
        vec![step]
    }

    fn metrics(&self, acc: &EventAccumulator) -> ExerciseMetrics {
        let elapsed_seconds = acc.elapsed_seconds();
        ExerciseMetrics::Sprint {
            elapsed_seconds,
            status: if elapsed_seconds.is_some() {
                SprintStatus::Success
            } else {
                SprintStatus::Incomplete
            },
        }
    }

    fn raw_score(&self, acc: &EventAccumulator) -> f64 {
        acc.elapsed_seconds().unwrap_or(0.0).max(0.0)
    }

    fn summary(&self, acc: &EventAccumulator, _feedback: &FeedbackLog) -> String {
        match acc.elapsed_seconds() {
            Some(seconds) => format!("Sprint completed in {:.2} s.", seconds),
            None => "Sprint incomplete: finish line not reached.".to_string(),
        }
    }
}

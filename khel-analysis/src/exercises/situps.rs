//! Sit-ups: left shoulder-hip-knee angle
//!
//! The athlete starts lying down, so the machine starts armed. Curling to 90°
//! or less counts a rep; lying back past 160° re-arms.

use super::hysteresis::{Band, Cue, Phase, RepMachine, RepProfile, Threshold};
use super::{rep_metrics, single, ExerciseAnalyzer, FrameContext};
use crate::accumulator::{EventAccumulator, FeedbackLog};
use crate::geometry::angle;
use crate::models::{BodyLandmark, ExerciseKind, ExerciseMetrics, Step};

pub const SIT_UPS: RepProfile = RepProfile {
    armed_state: "down",
    counted_state: "up",
    count_when: Threshold::AtMost(90.0),
    rearm_when: Threshold::Above(160.0),
    starts_armed: true,
    on_arm: &[],
    on_count: &[Cue::strength("Full sit-up range of motion")],
    bands: &[Band {
        phase: Phase::Counted,
        lower: Threshold::Above(120.0),
        upper: Threshold::AtMost(160.0),
        cues: &[
            Cue::mistake("Not returning fully to the mat"),
            Cue::tip("Lower your back all the way down between reps"),
        ],
    }],
    rearm_check: None,
};

pub struct SitUpAnalyzer {
    machine: RepMachine,
}

impl SitUpAnalyzer {
    pub fn new() -> Self {
        Self {
            machine: RepMachine::new(SIT_UPS),
        }
    }
}

impl Default for SitUpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn torso_angle(ctx: &FrameContext<'_>) -> Option<f64> {
    let shoulder = ctx.point(BodyLandmark::LeftShoulder)?;
    let hip = ctx.point(BodyLandmark::LeftHip)?;
    let knee = ctx.point(BodyLandmark::LeftKnee)?;
    Some(angle(shoulder, hip, knee))
}

impl ExerciseAnalyzer for SitUpAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::SitUps
    }

    fn observe(&mut self, ctx: &FrameContext<'_>) -> Vec<Step> {
        single(self.machine.observe(ctx.frame(), torso_angle(ctx)))
    }

    fn metrics(&self, acc: &EventAccumulator) -> ExerciseMetrics {
        rep_metrics(acc)
    }

    fn raw_score(&self, acc: &EventAccumulator) -> f64 {
        f64::from(acc.reps())
    }

    fn summary(&self, acc: &EventAccumulator, _feedback: &FeedbackLog) -> String {
        format!("You performed {} sit-ups.", acc.reps())
    }
}

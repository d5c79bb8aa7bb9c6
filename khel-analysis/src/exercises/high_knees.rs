//! High knees: one machine per leg
//!
//! Metric: knee y / hip y. Image y grows downward, so a ratio below 1 means
//! the knee is above the hip. Each leg counts independently.

use super::hysteresis::{Cue, RearmCheck, RepMachine, RepProfile, Threshold};
use super::{rep_metrics, ExerciseAnalyzer, FrameContext};
use crate::accumulator::{EventAccumulator, FeedbackLog};
use crate::models::{BodyLandmark, ExerciseKind, ExerciseMetrics, Step};

const COUNT_WHEN: Threshold = Threshold::Below(1.0);
const REARM_WHEN: Threshold = Threshold::Above(1.05);
const INCOMPLETE_WHEN: Threshold = Threshold::Below(1.1);

pub const LEFT_LEG: RepProfile = RepProfile {
    armed_state: "down",
    counted_state: "up",
    count_when: COUNT_WHEN,
    rearm_when: REARM_WHEN,
    starts_armed: true,
    on_arm: &[],
    on_count: &[Cue::strength("Knees lifted high above hip level")],
    bands: &[],
    rearm_check: Some(RearmCheck {
        when: INCOMPLETE_WHEN,
        cues: &[
            Cue::mistake("Left knee not raised high enough"),
            Cue::tip("Lift left knee above hip height for full rep"),
        ],
    }),
};

pub const RIGHT_LEG: RepProfile = RepProfile {
    on_count: &[Cue::strength("Consistent alternating knee lifts")],
    rearm_check: Some(RearmCheck {
        when: INCOMPLETE_WHEN,
        cues: &[
            Cue::mistake("Right knee not raised high enough"),
            Cue::tip("Lift right knee above hip height for full rep"),
        ],
    }),
    ..LEFT_LEG
};

pub struct HighKneesAnalyzer {
    left: RepMachine,
    right: RepMachine,
}

impl HighKneesAnalyzer {
    pub fn new() -> Self {
        Self {
            left: RepMachine::new(LEFT_LEG),
            right: RepMachine::new(RIGHT_LEG),
        }
    }
}

impl Default for HighKneesAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn knee_ratio(ctx: &FrameContext<'_>, hip: BodyLandmark, knee: BodyLandmark) -> Option<f64> {
    let hip = ctx.point(hip)?;
    let knee = ctx.point(knee)?;
    (hip.y > f64::EPSILON).then(|| knee.y / hip.y)
}

impl ExerciseAnalyzer for HighKneesAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::HighKnees
    }

    fn observe(&mut self, ctx: &FrameContext<'_>) -> Vec<Step> {
        let frame = ctx.frame();
        let left = knee_ratio(ctx, BodyLandmark::LeftHip, BodyLandmark::LeftKnee);
        let right = knee_ratio(ctx, BodyLandmark::RightHip, BodyLandmark::RightKnee);

        [self.left.observe(frame, left), self.right.observe(frame, right)]
            .into_iter()
            .filter(|step| !step.is_empty())
            .collect()
    }

    fn metrics(&self, acc: &EventAccumulator) -> ExerciseMetrics {
        rep_metrics(acc)
    }

    fn raw_score(&self, acc: &EventAccumulator) -> f64 {
        f64::from(acc.reps())
    }

    fn summary(&self, acc: &EventAccumulator, _feedback: &FeedbackLog) -> String {
        format!(
            "Performed {} high knees with {} incomplete reps.",
            acc.reps(),
            acc.incomplete_reps()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::test_support::{drive, frame};
    use crate::models::LandmarkFrame;

    fn legs(index: u64, left_knee_y: f64, right_knee_y: f64) -> LandmarkFrame {
        frame(
            index,
            &[
                (BodyLandmark::LeftHip, 0.45, 0.5),
                (BodyLandmark::RightHip, 0.55, 0.5),
                (BodyLandmark::LeftKnee, 0.45, left_knee_y),
                (BodyLandmark::RightKnee, 0.55, right_knee_y),
            ],
        )
    }

    #[test]
    fn test_alternating_legs() {
        // ratios: 0.8 = lifted, 1.2 = fully down
        let frames = vec![
            legs(0, 0.6, 0.6),
            legs(1, 0.4, 0.6),
            legs(2, 0.6, 0.4),
            legs(3, 0.4, 0.6),
            legs(4, 0.6, 0.4),
        ];
        let mut analyzer = HighKneesAnalyzer::new();
        let (acc, log) = drive(&mut analyzer, &frames, None);

        assert_eq!(acc.reps(), 4);
        assert_eq!(acc.incomplete_reps(), 0);
        assert_eq!(
            log.strengths(),
            vec!["Knees lifted high above hip level", "Consistent alternating knee lifts"]
        );
    }

    #[test]
    fn test_both_legs_counting_same_frame() {
        let frames = vec![legs(0, 0.4, 0.4)];
        let mut analyzer = HighKneesAnalyzer::new();
        let steps = analyzer.observe(&crate::exercises::test_support::context(&frames[0], None));
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.event.is_some()));
    }

    #[test]
    fn test_low_return_counts_incomplete() {
        // Left knee lifts, then drops only to ratio 1.08 before the next lift
        let frames = vec![legs(0, 0.4, 0.6), legs(1, 0.54, 0.6), legs(2, 0.4, 0.6)];
        let mut analyzer = HighKneesAnalyzer::new();
        let (acc, log) = drive(&mut analyzer, &frames, None);

        assert_eq!(acc.reps(), 2);
        assert_eq!(acc.incomplete_reps(), 1);
        assert_eq!(log.mistakes(), vec!["Left knee not raised high enough"]);
        assert_eq!(
            analyzer.summary(&acc, &log),
            "Performed 2 high knees with 1 incomplete reps."
        );
    }
}

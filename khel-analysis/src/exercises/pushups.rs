//! Push-ups: left elbow angle
//!
//! Arms locked above 160° arm the machine ("up"); bending to 90° or less
//! counts a rep ("down").

use super::hysteresis::{Band, Cue, Phase, RepMachine, RepProfile, Threshold};
use super::{rep_metrics, single, ExerciseAnalyzer, FrameContext};
use crate::accumulator::{EventAccumulator, FeedbackLog};
use crate::geometry::angle;
use crate::models::{BodyLandmark, ExerciseKind, ExerciseMetrics, Step};

pub const PUSH_UPS: RepProfile = RepProfile {
    armed_state: "up",
    counted_state: "down",
    count_when: Threshold::AtMost(90.0),
    rearm_when: Threshold::Above(160.0),
    starts_armed: false,
    on_arm: &[Cue::strength("Full arm extension at the top of push-ups")],
    on_count: &[Cue::strength("Reaching proper depth during push-ups")],
    bands: &[
        Band {
            phase: Phase::Armed,
            lower: Threshold::Above(90.0),
            upper: Threshold::Below(120.0),
            cues: &[
                Cue::mistake("Not lowering chest enough"),
                Cue::tip("Lower chest until elbows reach ~90° angle"),
            ],
        },
        Band {
            phase: Phase::Counted,
            lower: Threshold::Above(140.0),
            upper: Threshold::AtMost(160.0),
            cues: &[
                Cue::mistake("Not extending arms fully"),
                Cue::tip("Lock arms at the top for full range"),
            ],
        },
    ],
    rearm_check: None,
};

pub struct PushUpAnalyzer {
    machine: RepMachine,
}

impl PushUpAnalyzer {
    pub fn new() -> Self {
        Self {
            machine: RepMachine::new(PUSH_UPS),
        }
    }
}

impl Default for PushUpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shoulder-elbow-wrist angle of the left arm
pub fn elbow_angle(ctx: &FrameContext<'_>) -> Option<f64> {
    let shoulder = ctx.point(BodyLandmark::LeftShoulder)?;
    let elbow = ctx.point(BodyLandmark::LeftElbow)?;
    let wrist = ctx.point(BodyLandmark::LeftWrist)?;
    Some(angle(shoulder, elbow, wrist))
}

impl ExerciseAnalyzer for PushUpAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::PushUps
    }

    fn observe(&mut self, ctx: &FrameContext<'_>) -> Vec<Step> {
        single(self.machine.observe(ctx.frame(), elbow_angle(ctx)))
    }

    fn metrics(&self, acc: &EventAccumulator) -> ExerciseMetrics {
        rep_metrics(acc)
    }

    fn raw_score(&self, acc: &EventAccumulator) -> f64 {
        f64::from(acc.reps())
    }

    fn summary(&self, acc: &EventAccumulator, feedback: &FeedbackLog) -> String {
        format!(
            "You performed {} push-ups. Strengths: {}. Mistakes: {}.",
            acc.reps(),
            feedback.strengths().join(", "),
            feedback.mistakes().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::test_support::{drive, frame};
    use crate::models::LandmarkFrame;

    /// Left arm bent to roughly `degrees` at the elbow
    fn arm(index: u64, degrees: f64) -> LandmarkFrame {
        let phi = (180.0 - degrees).to_radians();
        frame(
            index,
            &[
                (BodyLandmark::LeftShoulder, 0.3, 0.5),
                (BodyLandmark::LeftElbow, 0.5, 0.5),
                (BodyLandmark::LeftWrist, 0.5 + 0.2 * phi.cos(), 0.5 + 0.2 * phi.sin()),
            ],
        )
    }

    #[test]
    fn test_counts_full_reps() {
        let angles = [175.0, 170.0, 80.0, 75.0, 170.0, 85.0, 172.0];
        let frames: Vec<_> = angles.iter().enumerate().map(|(i, a)| arm(i as u64, *a)).collect();
        let mut analyzer = PushUpAnalyzer::new();
        let (acc, log) = drive(&mut analyzer, &frames, None);

        assert_eq!(acc.reps(), 2);
        assert_eq!(analyzer.raw_score(&acc), 2.0);
        assert_eq!(
            log.strengths(),
            vec![
                "Full arm extension at the top of push-ups",
                "Reaching proper depth during push-ups"
            ]
        );
        assert_eq!(log.mistakes(), vec!["No major mistakes detected"]);
    }

    #[test]
    fn test_shallow_and_unlocked_feedback() {
        let angles = [170.0, 110.0, 80.0, 150.0, 170.0];
        let frames: Vec<_> = angles.iter().enumerate().map(|(i, a)| arm(i as u64, *a)).collect();
        let mut analyzer = PushUpAnalyzer::new();
        let (acc, log) = drive(&mut analyzer, &frames, None);

        assert_eq!(acc.reps(), 1);
        assert_eq!(
            log.mistakes(),
            vec!["Not lowering chest enough", "Not extending arms fully"]
        );
        assert!(analyzer.summary(&acc, &log).starts_with("You performed 1 push-ups."));
    }

    #[test]
    fn test_occluded_arm_skipped() {
        let mut hidden = arm(1, 80.0);
        hidden.landmarks.get_mut(&BodyLandmark::LeftWrist).unwrap().visibility = 0.1;
        let frames = vec![arm(0, 170.0), hidden, arm(2, 170.0)];
        let mut analyzer = PushUpAnalyzer::new();
        let (acc, _) = drive(&mut analyzer, &frames, None);
        assert_eq!(acc.reps(), 0);
    }
}

//! Vertical jump: running extremum of the mid-hip height
//!
//! Not a discrete state machine. The lowest and highest mid-hip pixel y are
//! tracked for the whole session; at end of stream their difference divided
//! by the calibrated scale is the jump height, emitted as one `JumpPeak`.

use super::{single, ExerciseAnalyzer, FrameContext};
use crate::accumulator::{EventAccumulator, FeedbackLog};
use crate::models::{BodyLandmark, EventKind, ExerciseKind, ExerciseMetrics, Step};

/// Normalized horizontal heel travel that counts as a drifting landing
pub const LANDING_DRIFT: f64 = 0.3;

/// Extremes of a pixel-y series
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeightTracker {
    /// Smallest y seen (highest point) and its frame
    peak: Option<(f64, u64)>,
    /// Largest y seen (lowest point)
    floor: Option<f64>,
}

impl HeightTracker {
    pub fn observe(&mut self, frame: u64, y: f64) {
        if self.peak.map_or(true, |(best, _)| y < best) {
            self.peak = Some((y, frame));
        }
        if self.floor.map_or(true, |lowest| y > lowest) {
            self.floor = Some(y);
        }
    }

    /// Frame of the highest point
    pub fn peak_frame(&self) -> Option<u64> {
        self.peak.map(|(_, frame)| frame)
    }

    /// Travel between extremes in centimetres, `None` before any sample
    pub fn height_cm(&self, pixels_per_cm: f64) -> Option<f64> {
        let (peak, _) = self.peak?;
        let floor = self.floor?;
        if !(pixels_per_cm > 0.0) {
            return None;
        }
        Some((floor - peak) / pixels_per_cm)
    }
}

pub struct VerticalJumpAnalyzer {
    explosive_jump_cm: f64,
    tracker: HeightTracker,
    pixels_per_cm: Option<f64>,
    start_heel_x: Option<f64>,
}

impl VerticalJumpAnalyzer {
    pub fn new(explosive_jump_cm: f64) -> Self {
        Self {
            explosive_jump_cm,
            tracker: HeightTracker::default(),
            pixels_per_cm: None,
            start_heel_x: None,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl ExerciseAnalyzer for VerticalJumpAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::VerticalJump
    }

    fn observe(&mut self, ctx: &FrameContext<'_>) -> Vec<Step> {
        if self.pixels_per_cm.is_none() {
            self.pixels_per_cm = ctx.reference.and_then(|r| r.pixels_per_cm());
        }

        let frame = ctx.frame();
        let mut step = Step::none();

        if let (Some(left), Some(right)) =
            (ctx.pixel(BodyLandmark::LeftHip), ctx.pixel(BodyLandmark::RightHip))
        {
            self.tracker.observe(frame, left.midpoint(right).y);
        }

        if let Some(heel) = ctx.visible(BodyLandmark::LeftHeel) {
            let start = *self.start_heel_x.get_or_insert(heel.x);
            if (heel.x - start).abs() > LANDING_DRIFT {
                step.mistake("Landed too far from start", frame);
                step.tip("Try to land softly and closer to starting point", frame);
            }
        }

        single(step)
    }

    fn finish(&mut self, last_frame: u64) -> Vec<Step> {
        let Some(height) = self
            .pixels_per_cm
            .and_then(|scale| self.tracker.height_cm(scale))
        else {
            return Vec::new();
        };

        let height = round2(height);
        let frame = self.tracker.peak_frame().unwrap_or(last_frame);
        let mut step = Step::with_event(EventKind::JumpPeak, frame, height);
        if height >= self.explosive_jump_cm {
            step.strength(format!("Explosive jump detected: {:.1} cm", height), frame);
        } else {
            step.tip("Drive your arms upward to gain extra height", frame);
        }
        vec![step]
    }

    fn metrics(&self, acc: &EventAccumulator) -> ExerciseMetrics {
        ExerciseMetrics::Jump {
            jump_height_cm: self.raw_score(acc),
        }
    }

    fn raw_score(&self, acc: &EventAccumulator) -> f64 {
        acc.peak_height_cm().unwrap_or(0.0).max(0.0)
    }

    fn summary(&self, acc: &EventAccumulator, _feedback: &FeedbackLog) -> String {
        format!("Best jump height: {:.2} cm.", self.raw_score(acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationReference;
    use crate::exercises::test_support::{drive, frame};
    use crate::models::LandmarkFrame;

    fn hips(index: u64, y: f64, heel_x: f64) -> LandmarkFrame {
        frame(
            index,
            &[
                (BodyLandmark::LeftHip, 0.45, y),
                (BodyLandmark::RightHip, 0.55, y),
                (BodyLandmark::LeftHeel, heel_x, 0.95),
            ],
        )
    }

    #[test]
    fn test_tracker_extremes() {
        let mut tracker = HeightTracker::default();
        for (i, y) in [300.0, 300.0, 150.0, 300.0].into_iter().enumerate() {
            tracker.observe(i as u64, y);
        }
        assert_eq!(tracker.height_cm(3.0), Some(50.0));
        assert_eq!(tracker.peak_frame(), Some(2));
        assert_eq!(HeightTracker::default().height_cm(3.0), None);
    }

    #[test]
    fn test_jump_peak_and_explosive_strength() {
        let reference = CalibrationReference::HeightScale { pixels_per_cm: 3.0 };
        let frames = vec![hips(0, 0.3, 0.45), hips(1, 0.3, 0.45), hips(2, 0.15, 0.45), hips(3, 0.3, 0.46)];
        let mut analyzer = VerticalJumpAnalyzer::new(40.0);
        let (acc, log) = drive(&mut analyzer, &frames, Some(&reference));

        assert_eq!(acc.peak_height_cm(), Some(50.0));
        assert_eq!(acc.events()[0].frame, 2);
        assert_eq!(log.strengths(), vec!["Explosive jump detected: 50.0 cm"]);
        assert_eq!(analyzer.summary(&acc, &log), "Best jump height: 50.00 cm.");
    }

    #[test]
    fn test_small_jump_gets_tip_and_drift_flagged() {
        let reference = CalibrationReference::HeightScale { pixels_per_cm: 5.0 };
        let frames = vec![hips(0, 0.5, 0.2), hips(1, 0.45, 0.2), hips(2, 0.5, 0.6)];
        let mut analyzer = VerticalJumpAnalyzer::new(40.0);
        let (acc, log) = drive(&mut analyzer, &frames, Some(&reference));

        assert_eq!(analyzer.raw_score(&acc), 10.0);
        assert_eq!(log.mistakes(), vec!["Landed too far from start"]);
        assert_eq!(
            log.tips(),
            vec![
                "Try to land softly and closer to starting point",
                "Drive your arms upward to gain extra height"
            ]
        );
    }

    #[test]
    fn test_no_samples_scores_zero() {
        let reference = CalibrationReference::HeightScale { pixels_per_cm: 5.0 };
        let mut analyzer = VerticalJumpAnalyzer::new(40.0);
        let (acc, _) = drive(&mut analyzer, &[], Some(&reference));
        assert!(acc.events().is_empty());
        assert_eq!(analyzer.raw_score(&acc), 0.0);
    }
}

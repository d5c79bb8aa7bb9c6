//! Predict-then-correct position smoother
//!
//! Per frame:
//! 1. Velocity over the last three raw samples, components inside the dead
//!    zone set to zero
//! 2. Exponential smoothing of that velocity
//! 3. Prediction = previous output + smoothed velocity
//! 4. Correction toward the raw sample; the gain drops to the braking gain
//!    when speed falls below the braking ratio of the previous frame's speed
//! 5. The result is bounded by the previous output and the raw sample, so the
//!    output never runs ahead of where the athlete actually is

use std::collections::VecDeque;

use super::PositionEstimator;
use crate::geometry::Point2;

/// Samples used for the velocity estimate
const VELOCITY_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictorTuning {
    /// Per-frame speed (pixels) treated as standing still
    pub dead_zone: f64,
    /// Weight of the newest velocity in the moving average
    pub smoothing: f64,
    /// Share of the prediction error corrected each frame
    pub correction_gain: f64,
    /// Speed ratio below which the athlete is considered braking
    pub braking_ratio: f64,
    /// Correction gain while braking
    pub braking_gain: f64,
}

impl Default for PredictorTuning {
    fn default() -> Self {
        Self {
            dead_zone: 2.0,
            smoothing: 0.5,
            correction_gain: 0.5,
            braking_ratio: 0.6,
            braking_gain: 0.4,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinearPredictor {
    tuning: PredictorTuning,
    history: VecDeque<Point2>,
    velocity: Point2,
    last_speed: f64,
    last_output: Option<Point2>,
}

impl LinearPredictor {
    pub fn new(tuning: PredictorTuning) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    fn raw_velocity(&self) -> Point2 {
        let (Some(first), Some(last)) = (self.history.front(), self.history.back()) else {
            return Point2::default();
        };
        let steps = (self.history.len() - 1).max(1) as f64;
        let dead = |v: f64| if v.abs() < self.tuning.dead_zone { 0.0 } else { v };
        Point2::new(dead((last.x - first.x) / steps), dead((last.y - first.y) / steps))
    }
}

/// Clamp `value` into the interval spanned by `a` and `b`
fn between(value: f64, a: f64, b: f64) -> f64 {
    value.clamp(a.min(b), a.max(b))
}

impl PositionEstimator for LinearPredictor {
    fn estimate(&mut self, raw: Point2) -> Point2 {
        if self.history.len() == VELOCITY_WINDOW {
            self.history.pop_front();
        }
        self.history.push_back(raw);

        let measured = self.raw_velocity();
        let a = self.tuning.smoothing;
        self.velocity = Point2::new(
            a * measured.x + (1.0 - a) * self.velocity.x,
            a * measured.y + (1.0 - a) * self.velocity.y,
        );

        let speed = self.velocity.x.hypot(self.velocity.y);
        let braking = speed < self.tuning.braking_ratio * self.last_speed;
        self.last_speed = speed;

        let output = match self.last_output {
            None => raw,
            Some(previous) => {
                let gain = if braking {
                    self.tuning.braking_gain
                } else {
                    self.tuning.correction_gain
                };
                let px = previous.x + self.velocity.x;
                let py = previous.y + self.velocity.y;
                Point2::new(
                    between(px + (raw.x - px) * gain, previous.x, raw.x),
                    between(py + (raw.y - py) * gain, previous.y, raw.y),
                )
            }
        };

        self.last_output = Some(output);
        output
    }
}

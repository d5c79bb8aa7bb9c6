//! Position estimators for horizontal tracking
//!
//! The shuttle-run state machine reads the athlete position through a
//! `PositionEstimator`. Which estimator runs is a configuration choice
//! (`analysis.shuttle_estimator`); the state machine never knows.

mod linear_predictor;

pub use linear_predictor::{LinearPredictor, PredictorTuning};

use khel_common::Error;
use std::str::FromStr;

use crate::geometry::Point2;

/// Turns a raw per-frame position into the position the tracker should use
pub trait PositionEstimator: Send {
    fn estimate(&mut self, raw: Point2) -> Point2;
}

/// Identity estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPosition;

impl PositionEstimator for RawPosition {
    fn estimate(&mut self, raw: Point2) -> Point2 {
        raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorKind {
    Raw,
    LinearPredictor,
}

impl EstimatorKind {
    pub fn build(self) -> Box<dyn PositionEstimator> {
        match self {
            EstimatorKind::Raw => Box::new(RawPosition),
            EstimatorKind::LinearPredictor => Box::new(LinearPredictor::default()),
        }
    }
}

impl FromStr for EstimatorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(EstimatorKind::Raw),
            "linear_predictor" => Ok(EstimatorKind::LinearPredictor),
            other => Err(Error::Config(format!("Unknown position estimator {:?}", other))),
        }
    }
}

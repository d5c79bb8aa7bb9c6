//! Per-session calibration
//!
//! Resolves the spatial or scale reference an exercise needs before it may
//! count anything:
//!
//! - **Line pair** (shuttle run): two near-vertical floor lines, see [`lines`]
//! - **Marker pair** (shuttle run): two saturated colored markers, see [`markers`]
//! - **Fixed pair**: references supplied with the request
//! - **Height scale** (vertical jump): pixels per centimetre, see [`scale`]
//!
//! The [`Calibrator`] ignores a settle window of leading frames, then spends
//! one attempt per frame. Its status is write-once: after `Resolved` or
//! `Failed` it never changes.

pub mod lines;
pub mod markers;
pub mod scale;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::media::SessionFrame;

/// How the reference should be obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationParams {
    Lines,
    Markers,
    /// Pixel references supplied by the caller
    Fixed { left_x: f64, right_x: f64 },
    HeightScale { athlete_height_cm: f64 },
}

/// A resolved reference; immutable for the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationReference {
    LinePair { left_x: f64, right_x: f64 },
    MarkerPair { left_x: f64, right_x: f64 },
    HeightScale { pixels_per_cm: f64 },
}

impl CalibrationReference {
    /// Horizontal references, left then right
    pub fn horizontal_pair(&self) -> Option<(f64, f64)> {
        match *self {
            CalibrationReference::LinePair { left_x, right_x }
            | CalibrationReference::MarkerPair { left_x, right_x } => Some((left_x, right_x)),
            CalibrationReference::HeightScale { .. } => None,
        }
    }

    pub fn pixels_per_cm(&self) -> Option<f64> {
        match *self {
            CalibrationReference::HeightScale { pixels_per_cm } => Some(pixels_per_cm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationStatus {
    Pending,
    Resolved(CalibrationReference),
    Failed(String),
}

/// Why a single attempt did not resolve
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("frame carries no image")]
    MissingImage,

    #[error("found {0} near-vertical line(s), need 2")]
    NotEnoughLines(usize),

    #[error("reference lines only {0:.1} px apart")]
    LinesTooClose(f64),

    #[error("found {0} marker(s), need 2")]
    NotEnoughMarkers(usize),

    #[error("nose and heels not visible")]
    LandmarksNotVisible,

    #[error("nose-to-heel distance is degenerate")]
    DegenerateScale,

    #[error("athlete height must be positive, got {0}")]
    InvalidHeight(f64),

    #[error("fixed references out of order: left {0} must be below right {1}")]
    InvalidFixedPair(f64, f64),
}

/// Drives one session's calibration to a terminal status
#[derive(Debug)]
pub struct Calibrator {
    params: CalibrationParams,
    settle_frames: u64,
    max_attempts: u32,
    visibility_threshold: f64,
    frames_seen: u64,
    attempts: u32,
    status: CalibrationStatus,
}

impl Calibrator {
    pub fn new(
        params: CalibrationParams,
        settle_frames: u64,
        max_attempts: u32,
        visibility_threshold: f64,
    ) -> Self {
        let status = match params {
            CalibrationParams::Fixed { left_x, right_x } if left_x < right_x => {
                CalibrationStatus::Resolved(CalibrationReference::MarkerPair { left_x, right_x })
            }
            CalibrationParams::Fixed { left_x, right_x } => CalibrationStatus::Failed(
                CalibrationError::InvalidFixedPair(left_x, right_x).to_string(),
            ),
            _ => CalibrationStatus::Pending,
        };

        Self {
            params,
            settle_frames,
            max_attempts: max_attempts.max(1),
            visibility_threshold,
            frames_seen: 0,
            attempts: 0,
            status,
        }
    }

    pub fn status(&self) -> &CalibrationStatus {
        &self.status
    }

    pub fn reference(&self) -> Option<&CalibrationReference> {
        match &self.status {
            CalibrationStatus::Resolved(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Feed one frame; returns the status after it
    pub fn observe(&mut self, frame: &SessionFrame) -> &CalibrationStatus {
        if !matches!(self.status, CalibrationStatus::Pending) {
            return &self.status;
        }

        self.frames_seen += 1;
        if self.frames_seen <= self.settle_frames {
            return &self.status;
        }

        self.attempts += 1;
        match self.attempt(frame) {
            Ok(reference) => {
                info!(
                    frame = frame.index,
                    attempts = self.attempts,
                    ?reference,
                    "Calibration resolved"
                );
                self.status = CalibrationStatus::Resolved(reference);
            }
            Err(err) => {
                debug!(frame = frame.index, attempt = self.attempts, "Calibration attempt failed: {}", err);
                if self.attempts >= self.max_attempts {
                    warn!(attempts = self.attempts, "Calibration failed: {}", err);
                    self.status = CalibrationStatus::Failed(format!(
                        "no reference after {} attempts (last: {})",
                        self.attempts, err
                    ));
                }
            }
        }

        &self.status
    }

    fn attempt(&self, frame: &SessionFrame) -> Result<CalibrationReference, CalibrationError> {
        match self.params {
            CalibrationParams::Lines => {
                let image = frame.image.as_ref().ok_or(CalibrationError::MissingImage)?;
                let (left_x, right_x) = lines::detect_vertical_lines(image)?;
                Ok(CalibrationReference::LinePair { left_x, right_x })
            }
            CalibrationParams::Markers => {
                let image = frame.image.as_ref().ok_or(CalibrationError::MissingImage)?;
                let (left_x, right_x) = markers::detect_marker_pair(image)?;
                Ok(CalibrationReference::MarkerPair { left_x, right_x })
            }
            CalibrationParams::HeightScale { athlete_height_cm } => {
                let landmarks = frame
                    .landmarks
                    .as_ref()
                    .ok_or(CalibrationError::LandmarksNotVisible)?;
                let pixels_per_cm = scale::pixels_per_cm(
                    landmarks,
                    frame.width,
                    frame.height,
                    athlete_height_cm,
                    self.visibility_threshold,
                )?;
                Ok(CalibrationReference::HeightScale { pixels_per_cm })
            }
            CalibrationParams::Fixed { left_x, right_x } => {
                Err(CalibrationError::InvalidFixedPair(left_x, right_x))
            }
        }
    }
}

//! Height-based pixel scale
//!
//! The athlete's nose-to-heel span in pixels, divided by their known height,
//! gives pixels per centimetre for the rest of the session.

use super::CalibrationError;
use crate::geometry::{distance, to_pixel};
use crate::models::{BodyLandmark, LandmarkFrame};

/// Spans shorter than this many pixels are treated as degenerate
const MIN_SPAN_PX: f64 = 1.0;

pub fn pixels_per_cm(
    landmarks: &LandmarkFrame,
    width: u32,
    height: u32,
    athlete_height_cm: f64,
    visibility_threshold: f64,
) -> Result<f64, CalibrationError> {
    if !(athlete_height_cm > 0.0) {
        return Err(CalibrationError::InvalidHeight(athlete_height_cm));
    }

    let [nose, left_heel, right_heel] = landmarks
        .all_visible(
            [BodyLandmark::Nose, BodyLandmark::LeftHeel, BodyLandmark::RightHeel],
            visibility_threshold,
        )
        .ok_or(CalibrationError::LandmarksNotVisible)?;

    let head = to_pixel(&nose, width, height);
    let feet = to_pixel(&left_heel, width, height).midpoint(to_pixel(&right_heel, width, height));

    let span = distance(head, feet);
    if span < MIN_SPAN_PX {
        return Err(CalibrationError::DegenerateScale);
    }

    Ok(span / athlete_height_cm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Landmark;

    fn upright(visibility: f64) -> LandmarkFrame {
        LandmarkFrame::new(12, 400)
            .with(BodyLandmark::Nose, Landmark::new(0.5, 0.1, visibility))
            .with(BodyLandmark::LeftHeel, Landmark::new(0.45, 0.9, visibility))
            .with(BodyLandmark::RightHeel, Landmark::new(0.55, 0.9, visibility))
    }

    #[test]
    fn test_scale_from_height() {
        let scale = pixels_per_cm(&upright(0.9), 1000, 1000, 160.0, 0.5).unwrap();
        assert!((scale - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_occluded_heels_fail_attempt() {
        assert_eq!(
            pixels_per_cm(&upright(0.3), 1000, 1000, 160.0, 0.5),
            Err(CalibrationError::LandmarksNotVisible)
        );
    }

    #[test]
    fn test_invalid_height() {
        assert_eq!(
            pixels_per_cm(&upright(0.9), 1000, 1000, 0.0, 0.5),
            Err(CalibrationError::InvalidHeight(0.0))
        );
    }

    #[test]
    fn test_collapsed_pose_is_degenerate() {
        let frame = LandmarkFrame::new(0, 0)
            .with(BodyLandmark::Nose, Landmark::new(0.5, 0.5, 1.0))
            .with(BodyLandmark::LeftHeel, Landmark::new(0.5, 0.5, 1.0))
            .with(BodyLandmark::RightHeel, Landmark::new(0.5, 0.5, 1.0));
        assert_eq!(
            pixels_per_cm(&frame, 640, 480, 170.0, 0.5),
            Err(CalibrationError::DegenerateScale)
        );
    }
}

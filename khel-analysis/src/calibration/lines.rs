//! Vertical reference line detection
//!
//! Grayscale → Canny edges → Hough transform. Lines within
//! [`MAX_TILT_DEGREES`] of vertical are intercepted at mid-height; the
//! leftmost and rightmost intercepts become the references.

use image::{imageops, RgbImage};
use imageproc::edges::canny;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

use super::CalibrationError;

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Allowed deviation from vertical
pub const MAX_TILT_DEGREES: u32 = 10;

/// Minimum reference separation as a fraction of frame width
pub const MIN_SEPARATION_RATIO: f64 = 0.05;

/// Fraction of the frame height a line must span in Hough votes
const VOTE_RATIO: f64 = 0.4;

const SUPPRESSION_RADIUS: u32 = 8;

/// Leftmost and rightmost near-vertical lines, as x at mid-height
pub fn detect_vertical_lines(image: &RgbImage) -> Result<(f64, f64), CalibrationError> {
    let (width, height) = image.dimensions();
    let gray = imageops::grayscale(image);
    let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);

    let options = LineDetectionOptions {
        vote_threshold: ((f64::from(height) * VOTE_RATIO) as u32).max(1),
        suppression_radius: SUPPRESSION_RADIUS,
    };

    let mid_y = f64::from(height) / 2.0;
    let mut intercepts: Vec<f64> = detect_lines(&edges, options)
        .iter()
        .filter_map(|line| vertical_intercept(line, mid_y))
        .filter(|x| (0.0..=f64::from(width)).contains(x))
        .collect();

    if intercepts.len() < 2 {
        return Err(CalibrationError::NotEnoughLines(intercepts.len()));
    }

    intercepts.sort_by(|a, b| a.total_cmp(b));
    let left = intercepts[0];
    let right = intercepts[intercepts.len() - 1];

    if right - left < f64::from(width) * MIN_SEPARATION_RATIO {
        return Err(CalibrationError::LinesTooClose(right - left));
    }

    Ok((left, right))
}

/// x where a near-vertical polar line crosses `y`
///
/// Polar form: x·cos θ + y·sin θ = r, θ measured from the x-axis to the
/// line normal. Vertical lines have θ near 0° or 180°.
fn vertical_intercept(line: &PolarLine, y: f64) -> Option<f64> {
    let theta = line.angle_in_degrees % 180;
    if theta > MAX_TILT_DEGREES && theta < 180 - MAX_TILT_DEGREES {
        return None;
    }

    let radians = f64::from(theta).to_radians();
    let cos = radians.cos();
    if cos.abs() < 1e-6 {
        return None;
    }
    Some((f64::from(line.r) - y * radians.sin()) / cos)
}

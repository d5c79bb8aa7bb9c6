//! Geometry helpers on landmark coordinates
//!
//! Stateless and side-effect free. Image coordinates: x grows to the right,
//! y grows downward.

use serde::{Deserialize, Serialize};

use crate::models::Landmark;

/// Vector length below which an arm of an angle is treated as degenerate
const DEGENERATE_LENGTH: f64 = 1e-9;

/// A 2D point, normalized or in pixels depending on context
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Angle at vertex `b` formed by `a`-`b`-`c`, in degrees within [0, 180]
///
/// Uses the dot-product formula with the cosine clamped to [-1, 1] so
/// rounding on collinear input never produces NaN.
///
/// Degenerate input (either arm shorter than 1e-9) returns 180.0: a joint
/// whose arm cannot be measured reads as fully extended.
pub fn angle(a: Point2, b: Point2, c: Point2) -> f64 {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if !(mag1 > DEGENERATE_LENGTH && mag2 > DEGENERATE_LENGTH) {
        return 180.0;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);

    cos_angle.acos().to_degrees()
}

/// Euclidean distance between two points
pub fn distance(p: Point2, q: Point2) -> f64 {
    (p.x - q.x).hypot(p.y - q.y)
}

/// Convert a normalized landmark to pixel coordinates
pub fn to_pixel(landmark: &Landmark, frame_width: u32, frame_height: u32) -> Point2 {
    Point2::new(
        landmark.x * f64::from(frame_width),
        landmark.y * f64::from(frame_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_joint() {
        let angle = angle(Point2::new(0.0, 0.0), Point2::new(0.5, 0.0), Point2::new(1.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle() {
        let angle = angle(Point2::new(0.0, 0.0), Point2::new(0.5, 0.0), Point2::new(0.5, 0.5));
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_folded_joint() {
        let angle = angle(Point2::new(1.0, 0.0), Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_returns_fallback() {
        let p = Point2::new(0.3, 0.3);
        assert_eq!(angle(p, p, Point2::new(1.0, 1.0)), 180.0);
        assert_eq!(angle(p, p, p), 180.0);
    }

    #[test]
    fn test_angle_bounded_over_grid() {
        let coords = [-2.0, -0.5, 0.0, 0.25, 1.0, 3.5];
        for &ax in &coords {
            for &ay in &coords {
                for &cx in &coords {
                    for &cy in &coords {
                        let value = angle(Point2::new(ax, ay), Point2::new(0.1, -0.2), Point2::new(cx, cy));
                        assert!((0.0..=180.0).contains(&value), "angle {} out of range", value);
                    }
                }
            }
        }
    }

    #[test]
    fn test_distance_and_pixels() {
        assert!((distance(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)) - 5.0).abs() < 1e-12);

        let landmark = Landmark::new(0.25, 0.5, 1.0);
        let pixel = to_pixel(&landmark, 1280, 720);
        assert_eq!(pixel, Point2::new(320.0, 360.0));
    }
}

//! Colored marker detection
//!
//! Saturated, reasonably bright pixels are segmented in HSV space, cleaned
//! with a morphological open then close, and traced into contours. The two
//! largest outer contours are the markers.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};

use super::CalibrationError;

/// Minimum HSV saturation of a marker pixel
pub const MIN_SATURATION: f64 = 0.6;
/// Minimum HSV value of a marker pixel
pub const MIN_VALUE: f64 = 0.3;
/// Minimum contour area as a fraction of the frame area
pub const MIN_AREA_RATIO: f64 = 0.0005;

const MORPH_RADIUS: u8 = 2;

/// Horizontal centroids of the two largest markers, left then right
pub fn detect_marker_pair(image: &RgbImage) -> Result<(f64, f64), CalibrationError> {
    let (width, height) = image.dimensions();
    let mask = saturation_mask(image);
    let cleaned = close(&open(&mask, Norm::LInf, MORPH_RADIUS), Norm::LInf, MORPH_RADIUS);

    let min_area = f64::from(width) * f64::from(height) * MIN_AREA_RATIO;
    let mut blobs: Vec<(f64, f64)> = find_contours::<i32>(&cleaned)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .filter_map(|c| {
            let area = polygon_area(c);
            (area >= min_area).then(|| (area, centroid_x(c)))
        })
        .collect();

    if blobs.len() < 2 {
        return Err(CalibrationError::NotEnoughMarkers(blobs.len()));
    }

    // Largest first; ties broken by position so the result is reproducible
    blobs.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.total_cmp(&b.1)));
    let (a, b) = (blobs[0].1, blobs[1].1);
    Ok((a.min(b), a.max(b)))
}

/// Binary mask of pixels passing the saturation and value gates
fn saturation_mask(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let (saturation, value) = saturation_value(r, g, b);
        if saturation >= MIN_SATURATION && value >= MIN_VALUE {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// HSV saturation and value, both in [0, 1]
fn saturation_value(r: u8, g: u8, b: u8) -> (f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 {
        return (0.0, 0.0);
    }
    let saturation = f64::from(max - min) / f64::from(max);
    (saturation, f64::from(max) / 255.0)
}

/// Shoelace area of a closed contour
fn polygon_area(contour: &Contour<i32>) -> f64 {
    (shoelace_sum(contour) / 2.0).abs()
}

fn shoelace_sum(contour: &Contour<i32>) -> f64 {
    let points = &contour.points;
    let n = points.len();
    (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            f64::from(p.x) * f64::from(q.y) - f64::from(q.x) * f64::from(p.y)
        })
        .sum()
}

/// Polygon centroid x, or the mean of the border points when degenerate
fn centroid_x(contour: &Contour<i32>) -> f64 {
    let points = &contour.points;
    let n = points.len();
    let twice_area = shoelace_sum(contour);

    if twice_area.abs() < 1e-9 {
        let sum: f64 = points.iter().map(|p| f64::from(p.x)).sum();
        return sum / n.max(1) as f64;
    }

    let moment: f64 = (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            let cross = f64::from(p.x) * f64::from(q.y) - f64::from(q.x) * f64::from(p.y);
            (f64::from(p.x) + f64::from(q.x)) * cross
        })
        .sum();

    moment / (3.0 * twice_area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn frame_with_markers(centers: &[(u32, u32)], size: u32) -> RgbImage {
        let mut image = RgbImage::from_pixel(200, 100, Rgb([90, 90, 90]));
        for &(cx, cy) in centers {
            let half = size / 2;
            for x in cx - half..cx + half {
                for y in cy - half..cy + half {
                    image.put_pixel(x, y, Rgb([230, 20, 20]));
                }
            }
        }
        image
    }

    #[test]
    fn test_two_markers_sorted_left_to_right() {
        let image = frame_with_markers(&[(170, 50), (30, 60)], 12);
        let (left, right) = detect_marker_pair(&image).unwrap();
        assert!((left - 29.5).abs() <= 1.5, "left = {}", left);
        assert!((right - 169.5).abs() <= 1.5, "right = {}", right);
    }

    #[test]
    fn test_single_marker_is_not_enough() {
        let image = frame_with_markers(&[(100, 50)], 12);
        assert_eq!(detect_marker_pair(&image), Err(CalibrationError::NotEnoughMarkers(1)));
    }

    #[test]
    fn test_gray_pixels_are_not_markers() {
        assert_eq!(saturation_value(90, 90, 90).0, 0.0);
        let (s, v) = saturation_value(230, 20, 20);
        assert!(s > 0.9 && v > 0.9);
        assert_eq!(saturation_value(0, 0, 0), (0.0, 0.0));
    }

    #[test]
    fn test_specks_removed_by_opening() {
        let mut image = frame_with_markers(&[(30, 50), (170, 50)], 12);
        image.put_pixel(100, 20, Rgb([0, 255, 0]));
        image.put_pixel(101, 20, Rgb([0, 255, 0]));
        let (left, right) = detect_marker_pair(&image).unwrap();
        assert!(left < 40.0 && right > 160.0);
    }
}

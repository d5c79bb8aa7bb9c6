//! Synthetic landmark frames
//!
//! Frames are 1000×1000 px so normalized coordinates map to pixels by ×1000.
//! Timestamps advance 40 ms per frame.

use khel_analysis::media::SessionFrame;
use khel_analysis::models::{BodyLandmark, Landmark, LandmarkFrame};

pub const FRAME_SIZE: u32 = 1000;
pub const FRAME_MS: u64 = 40;

/// Fully visible landmarks at normalized positions
pub fn pose(index: u64, points: &[(BodyLandmark, f64, f64)]) -> LandmarkFrame {
    points.iter().fold(
        LandmarkFrame::new(index, index * FRAME_MS),
        |frame, (id, x, y)| frame.with(*id, Landmark::new(*x, *y, 0.99)),
    )
}

/// Left arm bent to `degrees` at the elbow
pub fn arm_at(index: u64, degrees: f64) -> LandmarkFrame {
    let phi = (180.0 - degrees).to_radians();
    pose(
        index,
        &[
            (BodyLandmark::LeftShoulder, 0.3, 0.5),
            (BodyLandmark::LeftElbow, 0.5, 0.5),
            (BodyLandmark::LeftWrist, 0.5 + 0.2 * phi.cos(), 0.5 + 0.2 * phi.sin()),
        ],
    )
}

/// Nose at normalized `x`
pub fn runner(index: u64, x: f64) -> LandmarkFrame {
    pose(index, &[(BodyLandmark::Nose, x, 0.3)])
}

/// Standing athlete 800 px tall with hips at `hip_y`
pub fn jumper(index: u64, hip_y: f64) -> LandmarkFrame {
    pose(
        index,
        &[
            (BodyLandmark::Nose, 0.5, 0.1),
            (BodyLandmark::LeftHip, 0.45, hip_y),
            (BodyLandmark::RightHip, 0.55, hip_y),
            (BodyLandmark::LeftHeel, 0.48, 0.9),
            (BodyLandmark::RightHeel, 0.52, 0.9),
        ],
    )
}

pub fn session_frame(landmarks: LandmarkFrame) -> SessionFrame {
    SessionFrame {
        index: landmarks.index,
        timestamp_ms: landmarks.timestamp_ms,
        width: FRAME_SIZE,
        height: FRAME_SIZE,
        image: None,
        landmarks: Some(landmarks),
    }
}

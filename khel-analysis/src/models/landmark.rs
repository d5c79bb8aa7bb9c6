//! Body landmarks produced by the pose estimator
//!
//! Coordinates are normalized to the frame: (0, 0) is the top-left corner,
//! (1, 1) the bottom-right. `visibility` is the estimator's confidence in [0, 1].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The 33 pose landmarks, in canonical index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    /// Every landmark, ordered by index
    pub const ALL: [BodyLandmark; 33] = [
        BodyLandmark::Nose,
        BodyLandmark::LeftEyeInner,
        BodyLandmark::LeftEye,
        BodyLandmark::LeftEyeOuter,
        BodyLandmark::RightEyeInner,
        BodyLandmark::RightEye,
        BodyLandmark::RightEyeOuter,
        BodyLandmark::LeftEar,
        BodyLandmark::RightEar,
        BodyLandmark::MouthLeft,
        BodyLandmark::MouthRight,
        BodyLandmark::LeftShoulder,
        BodyLandmark::RightShoulder,
        BodyLandmark::LeftElbow,
        BodyLandmark::RightElbow,
        BodyLandmark::LeftWrist,
        BodyLandmark::RightWrist,
        BodyLandmark::LeftPinky,
        BodyLandmark::RightPinky,
        BodyLandmark::LeftIndex,
        BodyLandmark::RightIndex,
        BodyLandmark::LeftThumb,
        BodyLandmark::RightThumb,
        BodyLandmark::LeftHip,
        BodyLandmark::RightHip,
        BodyLandmark::LeftKnee,
        BodyLandmark::RightKnee,
        BodyLandmark::LeftAnkle,
        BodyLandmark::RightAnkle,
        BodyLandmark::LeftHeel,
        BodyLandmark::RightHeel,
        BodyLandmark::LeftFootIndex,
        BodyLandmark::RightFootIndex,
    ];

    /// Canonical pose-model index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Landmark for a pose-model index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// One estimated joint position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, z: None, visibility }
    }
}

/// Landmarks estimated for one decoded frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Frame index within the session, strictly increasing
    pub index: u64,
    /// Presentation timestamp in milliseconds
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub landmarks: BTreeMap<BodyLandmark, Landmark>,
}

impl LandmarkFrame {
    pub fn new(index: u64, timestamp_ms: u64) -> Self {
        Self {
            index,
            timestamp_ms,
            landmarks: BTreeMap::new(),
        }
    }

    /// Builder-style insert, convenient for synthetic frames
    pub fn with(mut self, id: BodyLandmark, landmark: Landmark) -> Self {
        self.landmarks.insert(id, landmark);
        self
    }

    pub fn get(&self, id: BodyLandmark) -> Option<&Landmark> {
        self.landmarks.get(&id)
    }

    /// Landmark only if its visibility reaches `threshold`
    pub fn visible(&self, id: BodyLandmark, threshold: f64) -> Option<&Landmark> {
        self.get(id).filter(|lm| lm.visibility >= threshold)
    }

    /// All requested landmarks, or `None` if any is missing or occluded
    pub fn all_visible<const N: usize>(
        &self,
        ids: [BodyLandmark; N],
        threshold: f64,
    ) -> Option<[Landmark; N]> {
        let mut found = [Landmark::new(0.0, 0.0, 0.0); N];
        for (slot, id) in found.iter_mut().zip(ids) {
            *slot = *self.visible(id, threshold)?;
        }
        Some(found)
    }
}

//! Media boundary
//!
//! Video decoding and pose estimation are external collaborators. The
//! session only sees a [`FrameStream`]: a sequential source of frames that
//! may carry the decoded image (for calibration) and the estimated landmarks.
//!
//! - [`PosePipeline`] combines a [`VideoDecoder`] and a [`PoseEstimator`]
//!   into a stream; a failed estimate leaves that frame without landmarks
//! - [`track::LandmarkTrackBackend`] reads landmark tracks produced by an
//!   external pose-estimation process
//! - [`download::VideoDownloader`] fetches remote videos named by URL

pub mod download;
pub mod spool;
pub mod track;

use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::models::LandmarkFrame;

pub use download::VideoDownloader;
pub use track::LandmarkTrackBackend;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Cannot open {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Pose estimation error: {0}")]
    Pose(String),

    #[error("Malformed track at line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("Cannot download {url}: {reason}")]
    Download { url: String, reason: String },
}

/// One frame as the session sees it
#[derive(Debug, Clone)]
pub struct SessionFrame {
    pub index: u64,
    pub timestamp_ms: u64,
    pub width: u32,
    pub height: u32,
    /// Decoded pixels, when the source has them
    pub image: Option<RgbImage>,
    /// `None` when pose estimation produced nothing for this frame
    pub landmarks: Option<LandmarkFrame>,
}

/// Sequential frame source owned by one session
pub trait FrameStream: Send {
    /// Next frame, `Ok(None)` at end of stream
    fn next_frame(&mut self) -> Result<Option<SessionFrame>, MediaError>;

    /// Release the decode handle and pose context; idempotent
    fn close(&mut self);
}

/// Opens a stream for an uploaded file
pub trait MediaBackend: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameStream>, MediaError>;
}

/// A decoded video frame
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub index: u64,
    pub timestamp_ms: u64,
    pub image: RgbImage,
}

pub trait VideoDecoder: Send {
    fn next_image(&mut self) -> Result<Option<DecodedFrame>, MediaError>;
    fn close(&mut self);
}

/// Blocking per-frame pose inference
pub trait PoseEstimator: Send {
    fn estimate(&mut self, frame: &DecodedFrame) -> Result<LandmarkFrame, MediaError>;
    fn close(&mut self);
}

/// Decoder + pose estimator as one frame stream
pub struct PosePipeline<D, P> {
    decoder: D,
    estimator: P,
    closed: bool,
}

impl<D: VideoDecoder, P: PoseEstimator> PosePipeline<D, P> {
    pub fn new(decoder: D, estimator: P) -> Self {
        Self {
            decoder,
            estimator,
            closed: false,
        }
    }
}

impl<D: VideoDecoder, P: PoseEstimator> FrameStream for PosePipeline<D, P> {
    fn next_frame(&mut self) -> Result<Option<SessionFrame>, MediaError> {
        if self.closed {
            return Ok(None);
        }
        let Some(decoded) = self.decoder.next_image()? else {
            return Ok(None);
        };

        let landmarks = match self.estimator.estimate(&decoded) {
            Ok(landmarks) => Some(landmarks),
            Err(e) => {
                debug!(frame = decoded.index, "Pose estimation failed, frame skipped: {}", e);
                None
            }
        };

        let (width, height) = decoded.image.dimensions();
        Ok(Some(SessionFrame {
            index: decoded.index,
            timestamp_ms: decoded.timestamp_ms,
            width,
            height,
            image: Some(decoded.image),
            landmarks,
        }))
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.estimator.close();
        self.decoder.close();
    }
}

//! Landmark track files
//!
//! JSON Lines produced by an external pose-estimation process:
//!
//! ```text
//! {"width":1280,"height":720}
//! {"index":0,"timestamp_ms":0,"landmarks":{"nose":{"x":0.5,"y":0.2,"visibility":0.98}, ...}}
//! {"index":1,"timestamp_ms":33,"landmarks":{...}}
//! ```
//!
//! The header line is optional; without it frames are assumed to be
//! 1280×720. Blank lines are ignored. Track frames carry no pixels, so
//! image-based calibration needs references supplied with the request.

use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::debug;

use super::{FrameStream, MediaBackend, MediaError, SessionFrame};
use crate::models::LandmarkFrame;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackHeader {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub fps: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TrackLine {
    Header(TrackHeader),
    Frame(LandmarkFrame),
}

/// Opens landmark track files
#[derive(Debug, Clone, Copy, Default)]
pub struct LandmarkTrackBackend;

impl MediaBackend for LandmarkTrackBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameStream>, MediaError> {
        Ok(Box::new(LandmarkTrackStream::open(path)?))
    }
}

pub struct LandmarkTrackStream {
    lines: Option<Lines<BufReader<File>>>,
    line_no: usize,
    width: u32,
    height: u32,
    /// First frame, read while probing for the header
    pending: Option<LandmarkFrame>,
}

impl LandmarkTrackStream {
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        let open_error = |reason: String| MediaError::Open {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| open_error(e.to_string()))?;
        let mut stream = Self {
            lines: Some(BufReader::new(file).lines()),
            line_no: 0,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            pending: None,
        };

        match stream.read_line().map_err(|e| open_error(e.to_string()))? {
            Some(TrackLine::Header(header)) => {
                if header.width == 0 || header.height == 0 {
                    return Err(open_error("frame dimensions must be positive".to_string()));
                }
                stream.width = header.width;
                stream.height = header.height;
            }
            Some(TrackLine::Frame(frame)) => {
                debug!("Track has no header, assuming {}x{}", DEFAULT_WIDTH, DEFAULT_HEIGHT);
                stream.pending = Some(frame);
            }
            None => {}
        }

        Ok(stream)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_line(&mut self) -> Result<Option<TrackLine>, MediaError> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };

        for line in lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return serde_json::from_str(&line)
                .map(Some)
                .map_err(|e| MediaError::Format {
                    line: self.line_no,
                    reason: e.to_string(),
                });
        }
        Ok(None)
    }

    fn frame(&self, landmarks: LandmarkFrame) -> SessionFrame {
        SessionFrame {
            index: landmarks.index,
            timestamp_ms: landmarks.timestamp_ms,
            width: self.width,
            height: self.height,
            image: None,
            landmarks: Some(landmarks),
        }
    }
}

impl FrameStream for LandmarkTrackStream {
    fn next_frame(&mut self) -> Result<Option<SessionFrame>, MediaError> {
        if let Some(first) = self.pending.take() {
            return Ok(Some(self.frame(first)));
        }

        match self.read_line()? {
            Some(TrackLine::Frame(landmarks)) => Ok(Some(self.frame(landmarks))),
            Some(TrackLine::Header(_)) => Err(MediaError::Format {
                line: self.line_no,
                reason: "header after the first line".to_string(),
            }),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        if self.lines.take().is_some() {
            debug!(lines = self.line_no, "Landmark track closed");
        }
        self.pending = None;
    }
}

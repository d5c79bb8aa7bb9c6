//! Frame stream doubles and track files

use khel_analysis::media::{FrameStream, MediaError, SessionFrame};
use khel_analysis::models::LandmarkFrame;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

use super::poses::FRAME_SIZE;

enum Scripted {
    Frame(SessionFrame),
    Fail(MediaError),
    Panic,
}

/// Replays scripted frames and counts `close()` calls
pub struct ScriptedStream {
    script: VecDeque<Scripted>,
    delay: Option<Duration>,
    closes: Arc<AtomicUsize>,
}

impl ScriptedStream {
    pub fn new(frames: impl IntoIterator<Item = SessionFrame>) -> Self {
        Self {
            script: frames.into_iter().map(Scripted::Frame).collect(),
            delay: None,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Landmark-only frames at the standard test size
    pub fn from_landmarks(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        Self::new(frames.into_iter().map(super::poses::session_frame))
    }

    pub fn then_fail(mut self, error: MediaError) -> Self {
        self.script.push_back(Scripted::Fail(error));
        self
    }

    pub fn then_panic(mut self) -> Self {
        self.script.push_back(Scripted::Panic);
        self
    }

    /// Sleep before every frame
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared close counter, readable after the stream is consumed
    pub fn closes(&self) -> Arc<AtomicUsize> {
        self.closes.clone()
    }

    pub fn boxed(self) -> (Box<dyn FrameStream>, Arc<AtomicUsize>) {
        let closes = self.closes();
        (Box::new(self), closes)
    }
}

impl FrameStream for ScriptedStream {
    fn next_frame(&mut self) -> Result<Option<SessionFrame>, MediaError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.script.pop_front() {
            Some(Scripted::Frame(frame)) => Ok(Some(frame)),
            Some(Scripted::Fail(error)) => Err(error),
            Some(Scripted::Panic) => panic!("decoder crashed"),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn close_count(closes: &Arc<AtomicUsize>) -> usize {
    closes.load(Ordering::SeqCst)
}

/// Landmark track file with a header line
pub fn write_track(frames: &[LandmarkFrame]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{{\"width\":{},\"height\":{}}}", FRAME_SIZE, FRAME_SIZE).unwrap();
    for frame in frames {
        writeln!(file, "{}", serde_json::to_string(frame).unwrap()).unwrap();
    }
    file.flush().unwrap();
    file
}

//! Analysis session lifecycle
//!
//! A session moves through:
//! CALIBRATING → TRACKING → COMPLETED | FAILED
//!
//! Exercises without a calibration need start directly in TRACKING.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ExerciseKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionPhase {
    /// Waiting for the settle window or resolving a reference
    Calibrating,
    /// Feeding frames to the exercise state machine
    Tracking,
    /// Stream ended and a result was assembled
    Completed,
    /// Session aborted with an analysis error
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub session_id: Uuid,
    pub old_phase: SessionPhase,
    pub new_phase: SessionPhase,
    pub transitioned_at: DateTime<Utc>,
}

/// Bookkeeping for one analysis session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub exercise: ExerciseKind,
    pub phase: SessionPhase,
    /// Frames handed to the state machine
    pub frames_processed: u64,
    /// Frames skipped (no landmarks, out of order, calibration pending)
    pub frames_skipped: u64,
    /// Index of the last accepted frame
    pub last_frame: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn new(session_id: Uuid, exercise: ExerciseKind, needs_calibration: bool) -> Self {
        Self {
            session_id,
            exercise,
            phase: if needs_calibration {
                SessionPhase::Calibrating
            } else {
                SessionPhase::Tracking
            },
            frames_processed: 0,
            frames_skipped: 0,
            last_frame: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn transition_to(&mut self, new_phase: SessionPhase) -> PhaseTransition {
        let transition = PhaseTransition {
            session_id: self.session_id,
            old_phase: self.phase,
            new_phase,
            transitioned_at: Utc::now(),
        };
        self.phase = new_phase;

        if self.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
        }

        transition
    }

    /// Accept a frame index if it is strictly after the last accepted one
    pub fn accept_frame(&mut self, index: u64) -> bool {
        match self.last_frame {
            Some(last) if index <= last => false,
            _ => {
                self.last_frame = Some(index);
                true
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, SessionPhase::Completed | SessionPhase::Failed)
    }
}

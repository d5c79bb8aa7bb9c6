//! Events and feedback emitted by the exercise state machines

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Rep,
    Lap,
    JumpPeak,
    SplitTime,
}

/// A counted unit of movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Frame that triggered the transition
    pub frame: u64,
    /// Metric value at the transition (angle, position, cm or seconds)
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Strength,
    Mistake,
    Tip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub category: FeedbackCategory,
    pub message: String,
    pub frame: u64,
}

/// Output of one state machine for one frame
///
/// Holds at most one event; feedback is unbounded. Analyzers that run one
/// machine per limb return one `Step` per machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub event: Option<Event>,
    pub feedback: Vec<FeedbackEntry>,
    /// Set when a repetition was started but not completed
    pub incomplete: bool,
}

impl Step {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_event(kind: EventKind, frame: u64, value: f64) -> Self {
        Self {
            event: Some(Event { kind, frame, value }),
            ..Self::default()
        }
    }

    pub fn strength(&mut self, message: impl Into<String>, frame: u64) {
        self.push(FeedbackCategory::Strength, message, frame);
    }

    pub fn mistake(&mut self, message: impl Into<String>, frame: u64) {
        self.push(FeedbackCategory::Mistake, message, frame);
    }

    pub fn tip(&mut self, message: impl Into<String>, frame: u64) {
        self.push(FeedbackCategory::Tip, message, frame);
    }

    pub fn push(&mut self, category: FeedbackCategory, message: impl Into<String>, frame: u64) {
        self.feedback.push(FeedbackEntry {
            category,
            message: message.into(),
            frame,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.event.is_none() && self.feedback.is_empty() && !self.incomplete
    }
}

//! Event accumulation and feedback synthesis
//!
//! Steps from the state machines land here. Events become counters;
//! feedback is de-duplicated per category by message text, keeping the
//! frame of the first occurrence.

use serde::Serialize;

use crate::models::{Event, EventKind, FeedbackCategory, FeedbackEntry, Step};

pub const DEFAULT_MISTAKE: &str = "No major mistakes detected";
pub const DEFAULT_STRENGTH: &str = "Good effort overall";
pub const DEFAULT_TIP: &str = "Keep practicing to improve further";

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventAccumulator {
    events: Vec<Event>,
    reps: u32,
    incomplete_reps: u32,
    laps: u32,
    peak_height_cm: Option<f64>,
    elapsed_seconds: Option<f64>,
}

impl EventAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: &Step) {
        if step.incomplete {
            self.incomplete_reps += 1;
        }

        let Some(event) = step.event else {
            return;
        };
        match event.kind {
            EventKind::Rep => self.reps += 1,
            EventKind::Lap => self.laps += 1,
            EventKind::JumpPeak => {
                let best = self.peak_height_cm.map_or(event.value, |h| h.max(event.value));
                self.peak_height_cm = Some(best);
            }
            EventKind::SplitTime => self.elapsed_seconds = Some(event.value),
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn incomplete_reps(&self) -> u32 {
        self.incomplete_reps
    }

    pub fn laps(&self) -> u32 {
        self.laps
    }

    pub fn peak_height_cm(&self) -> Option<f64> {
        self.peak_height_cm
    }

    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.elapsed_seconds
    }
}

/// Session feedback, unique per (category, message)
#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    entries: Vec<FeedbackEntry>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry; returns `false` if the message was already present
    pub fn record(&mut self, entry: FeedbackEntry) -> bool {
        let duplicate = self
            .entries
            .iter()
            .any(|e| e.category == entry.category && e.message == entry.message);
        if duplicate {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn record_step(&mut self, step: &Step) {
        for entry in &step.feedback {
            self.record(entry.clone());
        }
    }

    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    /// Messages of one category in first-seen order, without defaults
    pub fn messages(&self, category: FeedbackCategory) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn mistakes(&self) -> Vec<String> {
        or_default(self.messages(FeedbackCategory::Mistake), DEFAULT_MISTAKE)
    }

    pub fn strengths(&self) -> Vec<String> {
        or_default(self.messages(FeedbackCategory::Strength), DEFAULT_STRENGTH)
    }

    pub fn tips(&self) -> Vec<String> {
        or_default(self.messages(FeedbackCategory::Tip), DEFAULT_TIP)
    }
}

fn or_default(messages: Vec<String>, default: &str) -> Vec<String> {
    if messages.is_empty() {
        vec![default.to_string()]
    } else {
        messages
    }
}

//! Two-threshold repetition state machine
//!
//! One engine serves every repetition exercise. A [`RepProfile`] supplies the
//! thresholds and feedback cues; a [`RepMachine`] runs it over one scalar
//! metric per frame.
//!
//! ```text
//!            rearm_when                 count_when
//!   Unset ─────────────▶ Armed ──────────────────────▶ Counted
//!                          ▲        (emit Rep)            │
//!                          └──────────────────────────────┘
//!                                    rearm_when
//! ```
//!
//! The count and re-arm thresholds never overlap, so a metric oscillating on
//! one side of the band cannot count twice.

use crate::models::{EventKind, FeedbackCategory, Step};

/// One side of a hysteresis band
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    Below(f64),
    AtMost(f64),
    Above(f64),
    AtLeast(f64),
}

impl Threshold {
    pub fn holds(self, value: f64) -> bool {
        match self {
            Threshold::Below(t) => value < t,
            Threshold::AtMost(t) => value <= t,
            Threshold::Above(t) => value > t,
            Threshold::AtLeast(t) => value >= t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No re-arm seen yet; counting disabled
    Unset,
    Armed,
    Counted,
}

/// A feedback message attached to a transition or band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub category: FeedbackCategory,
    pub message: &'static str,
}

impl Cue {
    pub const fn strength(message: &'static str) -> Self {
        Self { category: FeedbackCategory::Strength, message }
    }

    pub const fn mistake(message: &'static str) -> Self {
        Self { category: FeedbackCategory::Mistake, message }
    }

    pub const fn tip(message: &'static str) -> Self {
        Self { category: FeedbackCategory::Tip, message }
    }
}

/// Metric range that produces feedback, but no event, while in `phase`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub phase: Phase,
    pub lower: Threshold,
    pub upper: Threshold,
    pub cues: &'static [Cue],
}

impl Band {
    fn contains(&self, phase: Phase, value: f64) -> bool {
        self.phase == phase && self.lower.holds(value) && self.upper.holds(value)
    }
}

/// Flags a repetition as incomplete when re-arming happens under `when`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RearmCheck {
    pub when: Threshold,
    pub cues: &'static [Cue],
}

/// Per-exercise strategy data for the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepProfile {
    pub armed_state: &'static str,
    pub counted_state: &'static str,
    pub count_when: Threshold,
    pub rearm_when: Threshold,
    pub starts_armed: bool,
    pub on_arm: &'static [Cue],
    pub on_count: &'static [Cue],
    pub bands: &'static [Band],
    pub rearm_check: Option<RearmCheck>,
}

#[derive(Debug, Clone)]
pub struct RepMachine {
    profile: RepProfile,
    phase: Phase,
    reps: u32,
    incomplete: u32,
}

impl RepMachine {
    pub fn new(profile: RepProfile) -> Self {
        Self {
            profile,
            phase: if profile.starts_armed { Phase::Armed } else { Phase::Unset },
            reps: 0,
            incomplete: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Name of the current state, `None` before the first re-arm
    pub fn state_name(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Unset => None,
            Phase::Armed => Some(self.profile.armed_state),
            Phase::Counted => Some(self.profile.counted_state),
        }
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn incomplete(&self) -> u32 {
        self.incomplete
    }

    /// Advance on one frame's metric; `None` skips the frame
    pub fn observe(&mut self, frame: u64, metric: Option<f64>) -> Step {
        let Some(value) = metric else {
            return Step::none();
        };
        if !value.is_finite() {
            return Step::none();
        }

        let profile = self.profile;

        if self.phase == Phase::Armed && profile.count_when.holds(value) {
            self.phase = Phase::Counted;
            self.reps += 1;
            let mut step = Step::with_event(EventKind::Rep, frame, value);
            push_cues(&mut step, profile.on_count, frame);
            return step;
        }

        if self.phase != Phase::Armed && profile.rearm_when.holds(value) {
            let mut step = Step::none();
            if self.phase == Phase::Counted {
                if let Some(check) = profile.rearm_check {
                    if check.when.holds(value) {
                        self.incomplete += 1;
                        step.incomplete = true;
                        push_cues(&mut step, check.cues, frame);
                    }
                }
            }
            self.phase = Phase::Armed;
            push_cues(&mut step, profile.on_arm, frame);
            return step;
        }

        let mut step = Step::none();
        for band in profile.bands.iter().filter(|b| b.contains(self.phase, value)) {
            push_cues(&mut step, band.cues, frame);
        }
        step
    }
}

fn push_cues(step: &mut Step, cues: &[Cue], frame: u64) {
    for cue in cues {
        step.push(cue.category, cue.message, frame);
    }
}

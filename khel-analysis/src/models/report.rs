//! Session report and scored result
//!
//! Wire shape of a result:
//!
//! ```text
//! {
//!   "raw_score": 12.0,
//!   "scaled_score": 3.16,
//!   "feedback": ["..."],
//!   "report": { <exercise fields>, "mistakes": [], "strengths": [], "tips": [], "analysis_summary": "..." }
//! }
//! ```
//!
//! An open failure carries `"report": {}`.

use serde::{Deserialize, Serialize, Serializer};

/// Feedback emitted when the input stream cannot be opened
pub const OPEN_FAILURE_MESSAGE: &str = "Could not open video.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SprintStatus {
    Success,
    Incomplete,
}

/// Exercise-specific counters, flattened into the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExerciseMetrics {
    Reps {
        total_reps: u32,
        incomplete_reps: u32,
    },
    Jump {
        jump_height_cm: f64,
    },
    Laps {
        laps: u32,
    },
    Sprint {
        elapsed_seconds: Option<f64>,
        status: SprintStatus,
    },
}

impl ExerciseMetrics {
    /// False only for a sprint that never reached the finish line
    pub fn is_complete(&self) -> bool {
        !matches!(
            self,
            ExerciseMetrics::Sprint {
                status: SprintStatus::Incomplete,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub metrics: ExerciseMetrics,
    pub mistakes: Vec<String>,
    pub strengths: Vec<String>,
    pub tips: Vec<String>,
    pub analysis_summary: String,
}

/// Terminal outcome of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub raw_score: f64,
    /// Always within [1, 10]
    pub scaled_score: f64,
    /// Strengths, then mistakes, then tips
    pub feedback: Vec<String>,
    #[serde(serialize_with = "serialize_report")]
    pub report: Option<AnalysisReport>,
}

impl ScoredResult {
    pub fn from_report(raw_score: f64, scaled_score: f64, report: AnalysisReport) -> Self {
        let feedback = report
            .strengths
            .iter()
            .chain(&report.mistakes)
            .chain(&report.tips)
            .cloned()
            .collect();

        Self {
            raw_score,
            scaled_score,
            feedback,
            report: Some(report),
        }
    }

    /// Result for a stream that could not be opened
    pub fn open_failure() -> Self {
        Self {
            raw_score: 0.0,
            scaled_score: 1.0,
            feedback: vec![OPEN_FAILURE_MESSAGE.to_string()],
            report: None,
        }
    }
}

fn serialize_report<S: Serializer>(
    report: &Option<AnalysisReport>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match report {
        Some(report) => report.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_open_failure_shape() {
        let value = serde_json::to_value(ScoredResult::open_failure()).unwrap();
        assert_eq!(
            value,
            json!({
                "raw_score": 0.0,
                "scaled_score": 1.0,
                "feedback": ["Could not open video."],
                "report": {}
            })
        );
    }

    #[test]
    fn test_metrics_are_flattened() {
        let report = AnalysisReport {
            metrics: ExerciseMetrics::Reps { total_reps: 3, incomplete_reps: 1 },
            mistakes: vec!["m".into()],
            strengths: vec!["s".into()],
            tips: vec!["t".into()],
            analysis_summary: "summary".into(),
        };
        let result = ScoredResult::from_report(3.0, 1.54, report);
        assert_eq!(result.feedback, vec!["s", "m", "t"]);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["report"]["total_reps"], 3);
        assert_eq!(value["report"]["incomplete_reps"], 1);
        assert_eq!(value["report"]["analysis_summary"], "summary");
    }

    #[test]
    fn test_incomplete_sprint_serializes_null_time() {
        let metrics = ExerciseMetrics::Sprint {
            elapsed_seconds: None,
            status: SprintStatus::Incomplete,
        };
        let value = serde_json::to_value(metrics).unwrap();
        assert_eq!(value, json!({"elapsed_seconds": null, "status": "INCOMPLETE"}));
    }
}

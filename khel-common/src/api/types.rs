//! Wire types exchanged with the submissions backend
//!
//! Field names are camelCase on the wire to match the backend's JSON.

use serde::{Deserialize, Serialize};

/// Score reported once per submission through the outbound callback
///
/// # Examples
///
/// ```
/// use khel_common::api::types::ScoreCallback;
///
/// let body = ScoreCallback { submission_id: "sub-1".to_string(), score: 7.5 };
/// let json = serde_json::to_string(&body).unwrap();
/// assert_eq!(json, r#"{"submissionId":"sub-1","score":7.5}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCallback {
    /// Backend identifier of the submission
    pub submission_id: String,
    /// Scaled score, or the failure sentinel
    pub score: f64,
}

/// Immediate acknowledgement for a background submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAccepted {
    pub submission_id: String,
    /// Analysis session created for this submission
    pub session_id: String,
    /// Always "processing" at acknowledgement time
    pub status: String,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Machine-readable code plus human-readable message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

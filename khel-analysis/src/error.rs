//! Error types for khel-analysis
//!
//! - `AnalysisError`: session-level failures of the engine
//! - `ApiError`: HTTP-facing errors with a JSON body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use khel_common::api::{ErrorDetail, ErrorResponse};
use thiserror::Error;

/// Session-level failure
///
/// Per-frame problems (occluded landmarks, a failed pose estimate) never
/// become an `AnalysisError`; the frame is skipped instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input stream could not be opened or decoded
    #[error("Could not open video: {0}")]
    VideoOpen(String),

    /// Required reference not resolved within the allowed attempts
    #[error("Calibration failed: {0}")]
    CalibrationFailure(String),

    /// Exercise name with no declared analyzer
    #[error("Unsupported exercise type: {0}")]
    UnsupportedExerciseType(String),

    /// Vertical jump requested without a positive athlete height
    #[error("Athlete height (cm) is required for the vertical jump")]
    MissingAthleteHeight,

    /// Session exceeded the watchdog limit
    #[error("Analysis timed out after {0} s")]
    Timeout(u64),

    #[error("Internal analysis error: {0}")]
    Internal(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or wrong shared secret (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Analysis failure surfaced to the caller
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Analysis(err) => match err {
                AnalysisError::UnsupportedExerciseType(_) => {
                    (StatusCode::BAD_REQUEST, "UNSUPPORTED_EXERCISE_TYPE")
                }
                AnalysisError::MissingAthleteHeight => {
                    (StatusCode::BAD_REQUEST, "MISSING_ATHLETE_HEIGHT")
                }
                AnalysisError::CalibrationFailure(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "CALIBRATION_FAILED")
                }
                AnalysisError::VideoOpen(_) => (StatusCode::INTERNAL_SERVER_ERROR, "MEDIA_ERROR"),
                AnalysisError::Timeout(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TIMEOUT"),
                AnalysisError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(code = error_code, "Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message: self.to_string(),
            },
        });

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

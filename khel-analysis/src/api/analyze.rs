//! Synchronous analysis
//!
//! POST /analyze runs one session on the blocking pool and answers with the
//! scored result. A video that cannot be opened or downloaded still answers
//! 200 with the open-failure result.

use axum::{extract::{Multipart, State}, Json};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};
use uuid::Uuid;

use super::upload::{UploadForm, VideoSource};
use crate::error::{AnalysisError, ApiResult};
use crate::models::ScoredResult;
use crate::session::AnalysisRequest;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub message: &'static str,
    pub score: ScoredResult,
}

/// POST /analyze
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let mut form = UploadForm::read(multipart, state.config.temp_dir.as_deref()).await?;
    let request = form.request()?;
    let video = form.take_video()?;

    let session_id = Uuid::new_v4();
    info!(%session_id, exercise = %request.exercise, "Analysis requested");

    let score = match run_source(&state, session_id, video, request).await {
        Err(AnalysisError::VideoOpen(reason)) => {
            warn!(%session_id, "Answering with the open-failure result: {}", reason);
            ScoredResult::open_failure()
        }
        outcome => outcome?,
    };
    Ok(Json(AnalyzeResponse {
        message: "Analysis successful",
        score,
    }))
}

/// Fetch the video if it is remote, then analyze it
///
/// A failed download is reported as `AnalysisError::VideoOpen`.
pub async fn run_source(
    state: &AppState,
    session_id: Uuid,
    source: VideoSource,
    request: AnalysisRequest,
) -> Result<ScoredResult, AnalysisError> {
    let video = match source {
        VideoSource::Upload(file) => file,
        VideoSource::Remote(url) => state
            .downloader
            .fetch(&url, state.config.temp_dir.as_deref())
            .await
            .map_err(|e| {
                warn!(%session_id, "Video download failed: {}", e);
                AnalysisError::VideoOpen(e.to_string())
            })?,
    };
    run_session(state, session_id, video, request).await
}

/// Analyze a spooled upload on the blocking pool
///
/// The upload is deleted when the session ends, whatever the outcome.
pub async fn run_session(
    state: &AppState,
    session_id: Uuid,
    video: NamedTempFile,
    request: AnalysisRequest,
) -> Result<ScoredResult, AnalysisError> {
    let orchestrator = state.orchestrator.clone();
    let backend = state.backend.clone();

    tokio::task::spawn_blocking(move || {
        let outcome =
            orchestrator.analyze_path_as(session_id, backend.as_ref(), video.path(), &request);
        drop(video);
        outcome
    })
    .await
    .map_err(|e| AnalysisError::Internal(format!("Analysis task failed: {}", e)))?
}

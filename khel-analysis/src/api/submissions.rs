//! Background submissions
//!
//! POST /submissions acknowledges immediately with 202 and runs the session
//! as a detached task. The outcome is reported exactly once through the
//! score callback.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use khel_common::api::SubmissionAccepted;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::analyze::run_source;
use super::upload::UploadForm;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /submissions
pub async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<SubmissionAccepted>)> {
    let mut form = UploadForm::read(multipart, state.config.temp_dir.as_deref()).await?;
    let submission_id = form
        .submission_id
        .take()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing submissionId".to_string()))?;
    let request = form.request()?;
    let video = form.take_video()?;

    let session_id = Uuid::new_v4();
    let span = info_span!("submission", %submission_id, %session_id);
    info!(parent: &span, exercise = %request.exercise, "Submission accepted");

    let accepted = SubmissionAccepted {
        submission_id: submission_id.clone(),
        session_id: session_id.to_string(),
        status: "processing".to_string(),
    };

    let task_state = state.clone();
    tokio::spawn(
        async move {
            let outcome = run_source(&task_state, session_id, video, request).await;
            task_state.callback.report(&submission_id, outcome.as_ref()).await;
        }
        .instrument(span),
    );

    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

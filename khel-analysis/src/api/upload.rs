//! Multipart upload handling shared by `/analyze` and `/submissions`
//!
//! The `video` part is spooled to a `NamedTempFile`, which deletes itself
//! when dropped. A `videoUrl` part names a remote video instead; it is
//! downloaded when the session runs. Text parts are parsed as they arrive.

use axum::extract::multipart::{Field, Multipart};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::calibration::CalibrationParams;
use crate::error::{ApiError, ApiResult};
use crate::media::spool::Spool;
use crate::session::AnalysisRequest;

/// Upper bound for one upload
pub const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Where the session's video comes from
#[derive(Debug)]
pub enum VideoSource {
    Upload(NamedTempFile),
    Remote(String),
}

/// Parsed multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub video: Option<NamedTempFile>,
    pub video_url: Option<String>,
    pub test_type: Option<String>,
    pub athlete_height_cm: Option<f64>,
    pub reference_left_x: Option<f64>,
    pub reference_right_x: Option<f64>,
    pub submission_id: Option<String>,
}

impl UploadForm {
    /// Read every part; unknown parts are ignored
    pub async fn read(mut multipart: Multipart, temp_dir: Option<&Path>) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "video" => form.video = Some(spool(field, temp_dir).await?),
                "videoUrl" => form.video_url = Some(text(field, &name).await?),
                "testType" => form.test_type = Some(text(field, &name).await?),
                "athleteHeightCm" => form.athlete_height_cm = number(field, &name).await?,
                "referenceLeftX" => form.reference_left_x = number(field, &name).await?,
                "referenceRightX" => form.reference_right_x = number(field, &name).await?,
                "submissionId" => form.submission_id = Some(text(field, &name).await?),
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Build the analysis request from the text parts
    pub fn request(&self) -> ApiResult<AnalysisRequest> {
        let test_type = self
            .test_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing testType".to_string()))?;

        let calibration = match (self.reference_left_x, self.reference_right_x) {
            (Some(left_x), Some(right_x)) => Some(CalibrationParams::Fixed { left_x, right_x }),
            (None, None) => None,
            _ => {
                return Err(ApiError::BadRequest(
                    "referenceLeftX and referenceRightX must be given together".to_string(),
                ))
            }
        };

        Ok(AnalysisRequest::parse(
            test_type,
            self.athlete_height_cm,
            calibration,
        )?)
    }

    /// Take the video source; an uploaded file wins over `videoUrl`
    pub fn take_video(&mut self) -> ApiResult<VideoSource> {
        if let Some(file) = self.video.take() {
            return Ok(VideoSource::Upload(file));
        }

        match self.video_url.take().filter(|u| !u.is_empty()) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(VideoSource::Remote(url))
            }
            Some(url) => Err(ApiError::BadRequest(format!(
                "videoUrl must be an http(s) URL, got {:?}",
                url
            ))),
            None => Err(ApiError::BadRequest("Missing video or videoUrl".to_string())),
        }
    }
}

async fn spool(mut field: Field<'_>, temp_dir: Option<&Path>) -> ApiResult<NamedTempFile> {
    let mut spool = Spool::create(temp_dir, MAX_UPLOAD_BYTES)?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Upload interrupted: {}", e)))?
    {
        spool.write(&chunk).await?;
    }

    let bytes = spool.written();
    let file = spool.finish().await?;
    debug!(bytes, path = %file.path().display(), "Upload spooled");
    Ok(file)
}

async fn text(field: Field<'_>, name: &str) -> ApiResult<String> {
    field
        .text()
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| ApiError::BadRequest(format!("Unreadable field {}: {}", name, e)))
}

/// Blank parts count as absent
async fn number(field: Field<'_>, name: &str) -> ApiResult<Option<f64>> {
    let raw = text(field, name).await?;
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("{} must be a number, got {:?}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::models::ExerciseKind;

    fn form(test_type: &str) -> UploadForm {
        UploadForm {
            test_type: Some(test_type.to_string()),
            ..UploadForm::default()
        }
    }

    #[test]
    fn test_request_from_form() {
        let request = form("Push-ups").request().unwrap();
        assert_eq!(request.exercise, ExerciseKind::PushUps);
        assert_eq!(request.calibration, None);
    }

    #[test]
    fn test_references_build_fixed_calibration() {
        let mut upload = form("Shuttle Run");
        upload.reference_left_x = Some(120.0);
        upload.reference_right_x = Some(980.0);
        assert_eq!(
            upload.request().unwrap().calibration,
            Some(CalibrationParams::Fixed { left_x: 120.0, right_x: 980.0 })
        );

        upload.reference_right_x = None;
        assert!(matches!(upload.request(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(matches!(UploadForm::default().request(), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            form("Vertical Jump").request(),
            Err(ApiError::Analysis(AnalysisError::MissingAthleteHeight))
        ));
        assert!(matches!(
            form("Juggling").request(),
            Err(ApiError::Analysis(AnalysisError::UnsupportedExerciseType(_)))
        ));
        assert!(matches!(form("Sprint").take_video(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_video_url_source() {
        let mut upload = form("Sprint");
        upload.video_url = Some("https://cdn.example.org/clips/42.mp4".to_string());
        assert!(matches!(
            upload.take_video(),
            Ok(VideoSource::Remote(url)) if url == "https://cdn.example.org/clips/42.mp4"
        ));

        upload.video_url = Some("file:///etc/passwd".to_string());
        assert!(matches!(upload.take_video(), Err(ApiError::BadRequest(_))));

        upload.video = Some(NamedTempFile::new().unwrap());
        upload.video_url = Some("https://cdn.example.org/clips/42.mp4".to_string());
        assert!(matches!(upload.take_video(), Ok(VideoSource::Upload(_))));
    }
}

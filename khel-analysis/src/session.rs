//! Session orchestration
//!
//! One call drives one session end to end:
//! frames → (calibration, once) → exercise analyzer → accumulator →
//! normalizer → `ScoredResult`.
//!
//! Guarantees:
//! - exactly one terminal outcome per call (a result or an `AnalysisError`)
//! - the frame stream is closed on every exit path, unwinding included
//! - sessions share no mutable state; an orchestrator may serve many threads

use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::accumulator::{EventAccumulator, FeedbackLog};
use crate::calibration::{CalibrationParams, CalibrationStatus, Calibrator};
use crate::config::{AnalysisSettings, ShuttleCalibration};
use crate::error::AnalysisError;
use crate::exercises::{build_analyzer, FrameContext};
use crate::media::{FrameStream, MediaBackend, MediaError, SessionFrame};
use crate::models::{
    AnalysisReport, CalibrationNeed, ExerciseKind, ScoredResult, SessionPhase, SessionRecord,
};
use crate::score::ScoreNormalizer;

/// What to analyze, validated at construction
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub exercise: ExerciseKind,
    pub athlete_height_cm: Option<f64>,
    /// Overrides the configured shuttle-run calibration
    pub calibration: Option<CalibrationParams>,
}

impl AnalysisRequest {
    pub fn new(
        exercise: ExerciseKind,
        athlete_height_cm: Option<f64>,
        calibration: Option<CalibrationParams>,
    ) -> Result<Self, AnalysisError> {
        if exercise == ExerciseKind::VerticalJump && !athlete_height_cm.is_some_and(|h| h > 0.0) {
            return Err(AnalysisError::MissingAthleteHeight);
        }
        Ok(Self {
            exercise,
            athlete_height_cm,
            calibration,
        })
    }

    /// Parse the exercise name first so unknown types fail before anything else
    pub fn parse(
        test_type: &str,
        athlete_height_cm: Option<f64>,
        calibration: Option<CalibrationParams>,
    ) -> Result<Self, AnalysisError> {
        Self::new(test_type.parse()?, athlete_height_cm, calibration)
    }

    pub fn simple(exercise: ExerciseKind) -> Result<Self, AnalysisError> {
        Self::new(exercise, None, None)
    }
}

/// Owns a session's frame stream and closes it exactly once
pub struct SessionResources {
    stream: Option<Box<dyn FrameStream>>,
}

impl SessionResources {
    pub fn new(stream: Box<dyn FrameStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub fn next_frame(&mut self) -> Result<Option<SessionFrame>, MediaError> {
        match self.stream.as_mut() {
            Some(stream) => stream.next_frame(),
            None => Ok(None),
        }
    }

    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
            debug!("Session resources released");
        }
    }
}

impl Drop for SessionResources {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Clone)]
pub struct SessionOrchestrator {
    settings: AnalysisSettings,
    normalizer: ScoreNormalizer,
    timeout: Option<Duration>,
}

impl SessionOrchestrator {
    pub fn new(settings: AnalysisSettings, normalizer: ScoreNormalizer) -> Self {
        Self {
            settings,
            normalizer,
            timeout: None,
        }
    }

    /// Bound every session by `timeout`, checked between frames
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn normalizer(&self) -> &ScoreNormalizer {
        &self.normalizer
    }

    /// Open `path` through `backend` and analyze it
    ///
    /// An unopenable input fails with `AnalysisError::VideoOpen`; callers
    /// answering synchronously render it as `ScoredResult::open_failure()`.
    pub fn analyze_path(
        &self,
        backend: &dyn MediaBackend,
        path: &Path,
        request: &AnalysisRequest,
    ) -> Result<ScoredResult, AnalysisError> {
        self.analyze_path_as(Uuid::new_v4(), backend, path, request)
    }

    /// [`Self::analyze_path`] under a caller-chosen session id
    pub fn analyze_path_as(
        &self,
        session_id: Uuid,
        backend: &dyn MediaBackend,
        path: &Path,
        request: &AnalysisRequest,
    ) -> Result<ScoredResult, AnalysisError> {
        match backend.open(path) {
            Ok(stream) => self.analyze_as(session_id, stream, request),
            Err(e) => {
                warn!(%session_id, exercise = %request.exercise, "Could not open input: {}", e);
                Err(AnalysisError::VideoOpen(e.to_string()))
            }
        }
    }

    fn calibration_params(&self, request: &AnalysisRequest) -> Option<CalibrationParams> {
        match request.exercise.calibration_need() {
            CalibrationNeed::None => None,
            CalibrationNeed::HeightScale => Some(CalibrationParams::HeightScale {
                athlete_height_cm: request.athlete_height_cm.unwrap_or(0.0),
            }),
            CalibrationNeed::SpatialPair => match request.calibration {
                Some(
                    params @ (CalibrationParams::Lines
                    | CalibrationParams::Markers
                    | CalibrationParams::Fixed { .. }),
                ) => Some(params),
                _ => Some(match self.settings.shuttle_calibration {
                    ShuttleCalibration::Markers => CalibrationParams::Markers,
                    ShuttleCalibration::Lines => CalibrationParams::Lines,
                }),
            },
        }
    }

    /// Run one session over `stream`
    pub fn analyze(
        &self,
        stream: Box<dyn FrameStream>,
        request: &AnalysisRequest,
    ) -> Result<ScoredResult, AnalysisError> {
        self.analyze_as(Uuid::new_v4(), stream, request)
    }

    pub fn analyze_as(
        &self,
        session_id: Uuid,
        stream: Box<dyn FrameStream>,
        request: &AnalysisRequest,
    ) -> Result<ScoredResult, AnalysisError> {
        let span = info_span!("session", %session_id, exercise = %request.exercise);
        let _guard = span.enter();

        let mut resources = SessionResources::new(stream);
        let params = self.calibration_params(request);
        let mut record = SessionRecord::new(session_id, request.exercise, params.is_some());

        info!(?params, "Session started");

        match self.run(&mut resources, &mut record, request, params) {
            Ok(result) => {
                let t = record.transition_to(SessionPhase::Completed);
                debug!(from = ?t.old_phase, to = ?t.new_phase, "Session phase changed");
                info!(
                    raw_score = result.raw_score,
                    scaled_score = result.scaled_score,
                    frames = record.frames_processed,
                    skipped = record.frames_skipped,
                    "Session completed"
                );
                Ok(result)
            }
            Err(e) => {
                let t = record.transition_to(SessionPhase::Failed);
                debug!(from = ?t.old_phase, to = ?t.new_phase, "Session phase changed");
                warn!(frames = record.frames_processed, "Session failed: {}", e);
                Err(e)
            }
        }
        // `resources` drops here and closes the stream on both paths
    }

    fn run(
        &self,
        resources: &mut SessionResources,
        record: &mut SessionRecord,
        request: &AnalysisRequest,
        params: Option<CalibrationParams>,
    ) -> Result<ScoredResult, AnalysisError> {
        let settings = &self.settings;
        let started = Instant::now();

        let mut calibrator = params.map(|p| {
            Calibrator::new(
                p,
                settings.settle_frames,
                settings.calibration_attempts,
                settings.visibility_threshold,
            )
        });
        if let Some(CalibrationStatus::Failed(reason)) = calibrator.as_ref().map(|c| c.status()) {
            return Err(AnalysisError::CalibrationFailure(reason.clone()));
        }

        let mut analyzer = build_analyzer(request.exercise, settings);
        let mut accumulator = EventAccumulator::new();
        let mut feedback = FeedbackLog::new();

        loop {
            if let Some(limit) = self.timeout {
                if started.elapsed() > limit {
                    return Err(AnalysisError::Timeout(limit.as_secs()));
                }
            }

            let frame = match resources.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        last_frame = ?record.last_frame,
                        "Frame stream error, treating as end of stream: {}", e
                    );
                    break;
                }
            };

            if !record.accept_frame(frame.index) {
                warn!(frame = frame.index, last_frame = ?record.last_frame, "Out-of-order frame skipped");
                record.frames_skipped += 1;
                continue;
            }

            if let Some(calibrator) = calibrator.as_mut() {
                match calibrator.observe(&frame).clone() {
                    CalibrationStatus::Pending => {
                        record.frames_skipped += 1;
                        continue;
                    }
                    CalibrationStatus::Failed(reason) => {
                        return Err(AnalysisError::CalibrationFailure(reason));
                    }
                    CalibrationStatus::Resolved(_) => {
                        if record.phase == SessionPhase::Calibrating {
                            let t = record.transition_to(SessionPhase::Tracking);
                            info!(
                                frame = frame.index,
                                from = ?t.old_phase,
                                to = ?t.new_phase,
                                "Calibration resolved"
                            );
                        }
                    }
                }
            }

            let Some(landmarks) = frame.landmarks.as_ref() else {
                debug!(frame = frame.index, "No landmarks, frame skipped");
                record.frames_skipped += 1;
                continue;
            };

            let ctx = FrameContext {
                landmarks,
                width: frame.width,
                height: frame.height,
                visibility_threshold: settings.visibility_threshold,
                reference: calibrator.as_ref().and_then(|c| c.reference()),
            };
            for step in analyzer.observe(&ctx) {
                accumulator.record(&step);
                feedback.record_step(&step);
            }
            record.frames_processed += 1;
        }

        resources.close();

        if let Some(calibrator) = calibrator.as_ref() {
            if calibrator.reference().is_none() {
                return Err(AnalysisError::CalibrationFailure(format!(
                    "stream ended after {} calibration attempt(s) without a reference",
                    calibrator.attempts()
                )));
            }
        }

        for step in analyzer.finish(record.last_frame.unwrap_or(0)) {
            accumulator.record(&step);
            feedback.record_step(&step);
        }

        let raw_score = analyzer.raw_score(&accumulator).max(0.0);
        let metrics = analyzer.metrics(&accumulator);
        let scaled_score =
            self.normalizer
                .normalize(request.exercise, raw_score, metrics.is_complete());
        let report = AnalysisReport {
            metrics,
            mistakes: feedback.mistakes(),
            strengths: feedback.strengths(),
            tips: feedback.tips(),
            analysis_summary: analyzer.summary(&accumulator, &feedback),
        };

        Ok(ScoredResult::from_report(raw_score, scaled_score, report))
    }
}

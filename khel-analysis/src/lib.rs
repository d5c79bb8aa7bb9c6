//! khel-analysis library interface
//!
//! Pose-based fitness test analysis: landmark streams in, scored results
//! out. The binary wraps this in an HTTP service; integration tests drive
//! both the engine and the router directly.

pub mod accumulator;
pub mod api;
pub mod calibration;
pub mod callback;
pub mod config;
pub mod error;
pub mod exercises;
pub mod geometry;
pub mod media;
pub mod models;
pub mod score;
pub mod session;
pub mod tracking;

pub use crate::error::{AnalysisError, ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::callback::{CallbackClient, CallbackError};
use crate::config::ServiceConfig;
use crate::media::{MediaBackend, VideoDownloader};
use crate::session::SessionOrchestrator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<ServiceConfig>,
    /// Stateless between sessions, shared by every request
    pub orchestrator: Arc<SessionOrchestrator>,
    /// Opens uploaded files as frame streams
    pub backend: Arc<dyn MediaBackend>,
    pub callback: CallbackClient,
    /// Fetches `videoUrl` submissions over the callback's HTTP client
    pub downloader: VideoDownloader,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServiceConfig, backend: Arc<dyn MediaBackend>) -> Result<Self, CallbackError> {
        let orchestrator = SessionOrchestrator::new(config.analysis.clone(), config.scoring.clone())
            .with_timeout(config.session_timeout);
        let callback = CallbackClient::new(config.callback_url.clone(), config.shared_secret.clone())?;
        let downloader =
            VideoDownloader::new(callback.http_client().clone(), api::MAX_UPLOAD_BYTES);

        Ok(Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            backend,
            callback,
            downloader,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
///
/// `/health` is public; analysis routes require the shared secret.
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::middleware;
    use axum::routing::post;
    use tower_http::trace::TraceLayer;

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/analyze", post(api::analyze))
        .route("/submissions", post(api::submit))
        .layer(DefaultBodyLimit::max(api::MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    Router::new()
        .merge(protected)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

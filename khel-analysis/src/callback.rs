//! Outbound score callback
//!
//! Each background submission reports its terminal score exactly once.
//! Delivery is best effort: failures are logged and never retried.

use khel_common::api::{ScoreCallback, SECRET_HEADER};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::AnalysisError;
use crate::models::ScoredResult;

/// Score reported when a session ends in failure
pub const FAILURE_SCORE: f64 = -1.0;

const USER_AGENT: &str = concat!("khel-analysis/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("No callback URL configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Callback rejected with HTTP {0}: {1}")]
    Rejected(u16, String),
}

/// Posts `ScoreCallback` bodies to the submissions backend
#[derive(Debug, Clone)]
pub struct CallbackClient {
    http_client: reqwest::Client,
    url: Option<String>,
    shared_secret: String,
}

impl CallbackClient {
    pub fn new(url: Option<String>, shared_secret: String) -> Result<Self, CallbackError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CallbackError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            shared_secret,
        })
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Score carried by the callback for a session outcome
    pub fn score_for(outcome: Result<&ScoredResult, &AnalysisError>) -> f64 {
        match outcome {
            Ok(result) => result.scaled_score,
            Err(_) => FAILURE_SCORE,
        }
    }

    /// Report one session outcome; logs instead of failing
    pub async fn report(
        &self,
        submission_id: &str,
        outcome: Result<&ScoredResult, &AnalysisError>,
    ) {
        let body = ScoreCallback {
            submission_id: submission_id.to_string(),
            score: Self::score_for(outcome),
        };

        match self.send(&body).await {
            Ok(()) => info!(
                submission_id = %body.submission_id,
                score = body.score,
                "Score callback delivered"
            ),
            Err(CallbackError::NotConfigured) => warn!(
                submission_id = %body.submission_id,
                score = body.score,
                "No callback URL configured, score not delivered"
            ),
            Err(e) => error!(
                submission_id = %body.submission_id,
                score = body.score,
                "Score callback failed: {}", e
            ),
        }
    }

    /// Single POST attempt
    pub async fn send(&self, body: &ScoreCallback) -> Result<(), CallbackError> {
        let url = self.url.as_deref().ok_or(CallbackError::NotConfigured)?;

        let mut request = self.http_client.post(url).json(body);
        if !self.shared_secret.is_empty() {
            request = request.header(SECRET_HEADER, &self.shared_secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CallbackError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CallbackError::Rejected(status.as_u16(), text));
        }
        Ok(())
    }
}

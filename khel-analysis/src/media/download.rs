//! Remote video download
//!
//! Submissions may name a `videoUrl` instead of uploading the file. The body
//! is streamed into a temporary file before the session opens it.

use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::spool::Spool;
use super::MediaError;

/// Whole-download bound; overrides the client's default timeout
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct VideoDownloader {
    http_client: Client,
    max_bytes: usize,
}

impl VideoDownloader {
    pub fn new(http_client: Client, max_bytes: usize) -> Self {
        Self {
            http_client,
            max_bytes,
        }
    }

    /// Download `url` into a temporary file under `temp_dir`
    pub async fn fetch(
        &self,
        url: &str,
        temp_dir: Option<&Path>,
    ) -> Result<NamedTempFile, MediaError> {
        let failed = |reason: String| MediaError::Download {
            url: url.to_string(),
            reason,
        };

        debug!(url, "Downloading video");
        let mut response = self
            .http_client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {}", status.as_u16())));
        }

        let mut spool = Spool::create(temp_dir, self.max_bytes)?;
        while let Some(chunk) = response.chunk().await.map_err(|e| failed(e.to_string()))? {
            spool.write(&chunk).await.map_err(|e| failed(e.to_string()))?;
        }
        let bytes = spool.written();
        let file = spool.finish().await?;

        info!(url, bytes, "Video downloaded");
        Ok(file)
    }
}

//! Router-level helpers

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use http_body_util::BodyExt;
use khel_analysis::config::ServiceConfig;
use khel_analysis::media::LandmarkTrackBackend;
use khel_analysis::AppState;
use khel_common::api::SECRET_HEADER;
use serde_json::Value;
use std::sync::Arc;

pub const BOUNDARY: &str = "khel-test-boundary";

/// App state over the landmark track backend
pub fn test_state(shared_secret: &str) -> AppState {
    let config = ServiceConfig {
        shared_secret: shared_secret.to_string(),
        ..ServiceConfig::default()
    };
    AppState::new(config, Arc::new(LandmarkTrackBackend)).unwrap()
}

/// Like [`test_state`], reporting scores to `callback_url`
pub fn callback_state(shared_secret: &str, callback_url: String) -> AppState {
    let config = ServiceConfig {
        shared_secret: shared_secret.to_string(),
        callback_url: Some(callback_url),
        ..ServiceConfig::default()
    };
    AppState::new(config, Arc::new(LandmarkTrackBackend)).unwrap()
}

/// POST a multipart form; `video` becomes a file part
pub fn multipart_request(
    uri: &str,
    secret: Option<&str>,
    fields: &[(&str, &str)],
    video: Option<&[u8]>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = video {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"clip.mp4\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(secret) = secret {
        builder = builder.header(SECRET_HEADER, secret);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn read_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

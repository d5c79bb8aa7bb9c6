//! Local stand-in for the submissions backend
//!
//! Records every score callback it receives and serves one track file for
//! `videoUrl` submissions. Unknown paths answer 404.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use khel_common::api::{ScoreCallback, SECRET_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct ReceivedCallback {
    pub secret: Option<String>,
    pub body: ScoreCallback,
}

#[derive(Clone)]
struct MockState {
    calls: mpsc::UnboundedSender<ReceivedCallback>,
    video: Arc<Vec<u8>>,
}

pub struct MockBackend {
    addr: SocketAddr,
    calls: mpsc::UnboundedReceiver<ReceivedCallback>,
}

impl MockBackend {
    /// Bind on an ephemeral port; `video` is served at [`Self::video_url`]
    pub async fn start(video: Vec<u8>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = MockState {
            calls: tx,
            video: Arc::new(video),
        };
        let app = Router::new()
            .route("/api/submissions/score", post(record_callback))
            .route("/videos/clip.jsonl", get(serve_video))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, calls: rx }
    }

    pub fn callback_url(&self) -> String {
        format!("http://{}/api/submissions/score", self.addr)
    }

    pub fn video_url(&self) -> String {
        format!("http://{}/videos/clip.jsonl", self.addr)
    }

    pub fn missing_video_url(&self) -> String {
        format!("http://{}/videos/deleted.jsonl", self.addr)
    }

    /// Wait for the next callback
    pub async fn next_callback(&mut self) -> ReceivedCallback {
        tokio::time::timeout(Duration::from_secs(10), self.calls.recv())
            .await
            .expect("no callback within 10 s")
            .expect("mock backend stopped")
    }

    /// Fails if another callback arrives within `window`
    pub async fn expect_no_more_callbacks(&mut self, window: Duration) {
        if let Ok(extra) = tokio::time::timeout(window, self.calls.recv()).await {
            panic!("unexpected extra callback: {:?}", extra);
        }
    }
}

async fn record_callback(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<ScoreCallback>,
) -> StatusCode {
    let secret = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let _ = state.calls.send(ReceivedCallback { secret, body });
    StatusCode::OK
}

async fn serve_video(State(state): State<MockState>) -> Vec<u8> {
    state.video.as_ref().clone()
}

//! Test Helper Utilities
//!
//! Shared utilities for testing khel-analysis

#![allow(dead_code)]

pub mod backend;
pub mod http;
pub mod poses;
pub mod streams;

// Re-export commonly used items
pub use backend::{MockBackend, ReceivedCallback};
pub use http::{callback_state, multipart_request, read_json, test_state, BOUNDARY};
pub use poses::{arm_at, jumper, pose, runner, session_frame, FRAME_SIZE};
pub use streams::{close_count, write_track, ScriptedStream};

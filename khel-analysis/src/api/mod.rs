//! HTTP API handlers

pub mod analyze;
pub mod auth;
pub mod health;
pub mod submissions;
pub mod upload;

pub use analyze::analyze;
pub use auth::auth_middleware;
pub use health::health_routes;
pub use submissions::submit;
pub use upload::MAX_UPLOAD_BYTES;

//! API module for shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared wire types
//!
//! The service wraps these with framework-specific middleware (Axum).

pub mod auth;
pub mod types;

pub use auth::{validate_secret, ApiAuthError, SECRET_HEADER};
pub use types::{ErrorDetail, ErrorResponse, ScoreCallback, SubmissionAccepted};

//! # Khel Common Library
//!
//! Shared code for the Khel analysis service and its callers:
//! - Error type and result alias
//! - TOML / environment configuration loading
//! - Shared-secret authentication helpers
//! - Wire types exchanged with the submissions backend

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};

//! Shared-secret authentication for internal API calls
//!
//! The submissions backend and the analysis service share one secret.
//! Every protected request carries it in the `x-internal-api-secret` header;
//! outbound callbacks carry the same header back.
//!
//! # Rules
//!
//! - Secrets are compared through their SHA-256 digests with a fold over all
//!   bytes, so comparison time does not depend on where the inputs differ.
//! - An empty configured secret disables checking altogether.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies here; the service wraps these in middleware.

use sha2::{Digest, Sha256};

/// Header carrying the shared secret
pub const SECRET_HEADER: &str = "x-internal-api-secret";

// ========================================
// Error Types
// ========================================

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuthError {
    /// Header absent from the request
    MissingSecret,

    /// Header present but does not match the configured secret
    InvalidSecret,
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::MissingSecret => write!(f, "Missing {} header", SECRET_HEADER),
            ApiAuthError::InvalidSecret => write!(f, "Unauthorized: Invalid API secret."),
        }
    }
}

impl std::error::Error for ApiAuthError {}

// ========================================
// Secret Validation
// ========================================

/// SHA-256 digest of a secret
pub fn secret_digest(secret: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}

/// Whether authentication is active for a configured secret
pub fn auth_enabled(configured: &str) -> bool {
    !configured.is_empty()
}

/// Validate a provided header value against the configured secret
///
/// # Examples
///
/// ```
/// use khel_common::api::auth::validate_secret;
///
/// assert!(validate_secret(Some("s3cret"), "s3cret").is_ok());
/// assert!(validate_secret(Some("guess"), "s3cret").is_err());
/// assert!(validate_secret(None, "").is_ok()); // auth disabled
/// ```
pub fn validate_secret(provided: Option<&str>, configured: &str) -> Result<(), ApiAuthError> {
    if !auth_enabled(configured) {
        return Ok(());
    }

    let provided = provided.ok_or(ApiAuthError::MissingSecret)?;

    let expected = secret_digest(configured);
    let actual = secret_digest(provided);
    let diff = expected
        .iter()
        .zip(actual.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    if diff == 0 {
        Ok(())
    } else {
        Err(ApiAuthError::InvalidSecret)
    }
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_secret_accepted() {
        assert!(validate_secret(Some("khel-internal"), "khel-internal").is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        assert_eq!(
            validate_secret(Some("khel-internal "), "khel-internal"),
            Err(ApiAuthError::InvalidSecret)
        );
    }

    #[test]
    fn test_missing_header_rejected() {
        assert_eq!(
            validate_secret(None, "khel-internal"),
            Err(ApiAuthError::MissingSecret)
        );
    }

    #[test]
    fn test_empty_secret_disables_auth() {
        assert!(!auth_enabled(""));
        assert!(validate_secret(None, "").is_ok());
        assert!(validate_secret(Some("anything"), "").is_ok());
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(secret_digest("abc"), secret_digest("abc"));
        assert_ne!(secret_digest("abc"), secret_digest("abd"));
    }
}

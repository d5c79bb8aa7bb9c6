//! Shared-secret authentication middleware
//!
//! Applied to the protected routes only; `/health` stays public.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use khel_common::api::{validate_secret, SECRET_HEADER};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Reject requests whose `x-internal-api-secret` header does not match
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = validate_secret(provided, &state.config.shared_secret) {
        warn!(path = %request.uri().path(), "Rejected request: {}", e);
        return Err(ApiError::Unauthorized(e.to_string()));
    }

    Ok(next.run(request).await)
}

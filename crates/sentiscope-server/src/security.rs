//! API key guard

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const INVALID_API_KEY: &str = "Invalid API Key";

/// Constant-time comparison of the configured key with the presented one.
/// No configured key means nothing matches.
pub fn key_matches(expected: Option<&str>, provided: Option<&str>) -> bool {
    match (expected, provided) {
        (Some(expected), Some(provided)) => {
            expected.as_bytes().ct_eq(provided.as_bytes()).into()
        }
        _ => false,
    }
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Middleware rejecting requests whose `X-API-Key` does not match
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state.config.auth.api_key.as_deref();

    if !key_matches(expected, presented_key(request.headers())) {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return Err(AppError::Forbidden(INVALID_API_KEY.to_string()));
    }

    Ok(next.run(request).await)
}

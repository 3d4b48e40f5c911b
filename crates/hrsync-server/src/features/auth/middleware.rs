//! Bearer token guard for protected routes
//!
//! # Examples
//!
//! ```rust,ignore
//! let protected = employees_routes().route_layer(
//!     axum::middleware::from_fn_with_state(state.clone(), require_bearer),
//! );
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::features::AppState;

pub const MISSING_CREDENTIALS_DETAIL: &str = "Authentication credentials were not provided.";
pub const INVALID_TOKEN_DETAIL: &str = "Given token not valid for any token type";

/// Extract the token from an `Authorization: Bearer <token>` header value
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Reject the request with 401 unless it carries a live bearer token
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized(MISSING_CREDENTIALS_DETAIL))?;

    let token = bearer_token(header).ok_or_else(|| AppError::unauthorized(INVALID_TOKEN_DETAIL))?;

    if !state.tokens.is_valid(token).await {
        tracing::debug!("Rejected unknown or expired token");
        return Err(AppError::unauthorized(INVALID_TOKEN_DETAIL));
    }

    Ok(next.run(request).await)
}

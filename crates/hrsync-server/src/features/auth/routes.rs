//! Token exchange route
//!
//! # Route Structure
//!
//! - `POST /api/token/` - Exchange credentials for a bearer token

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use hrsync_common::wire::{TokenRequest, TokenResponse, TOKEN_PATH};

use crate::error::AppError;
use crate::features::AppState;

/// Returned for any credential mismatch, without saying which part was wrong
pub const INVALID_CREDENTIALS_DETAIL: &str = "No active account found with the given credentials";

pub fn auth_routes() -> Router<AppState> {
    Router::new().route(TOKEN_PATH, post(issue_token))
}

/// Issue a bearer token
///
/// # Response
///
/// - `200 OK` - `{"access": "<token>"}`
/// - `400 Bad Request` - Body is not `{username, password}`
/// - `401 Unauthorized` - Credentials do not match
#[tracing::instrument(skip(state, body))]
async fn issue_token(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body.map_err(|e| AppError::bad_request(e.body_text()))?;

    if request.username != state.auth.username || request.password != state.auth.password {
        tracing::warn!(username = %request.username, "Rejected token request");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS_DETAIL));
    }

    let access = state.tokens.issue().await;
    tracing::info!(
        username = %request.username,
        ttl_secs = state.tokens.ttl().as_secs(),
        "Issued access token"
    );

    Ok((StatusCode::OK, Json(TokenResponse { access })).into_response())
}

//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hrsync_common::wire::ErrorBody;
use serde_json::json;
use thiserror::Error;

/// Application error types
///
/// Feature-specific errors (such as bulk creation) have their own response mapping;
/// this covers authentication, health and infrastructure failures.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // Token-style clients expect `{detail}` on authentication failures
            AppError::Unauthorized(ref detail) => {
                return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail })))
                    .into_response();
            },
            AppError::BadRequest(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Unavailable(ref message) => {
                (StatusCode::SERVICE_UNAVAILABLE, message.clone())
            },
        };

        let body = ErrorBody {
            message,
            error: None,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_uses_detail() {
        let response = AppError::unauthorized("Invalid token").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "detail": "Invalid token" }));
    }

    #[tokio::test]
    async fn test_unavailable_status() {
        let response = AppError::Unavailable("Database unavailable".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["message"], "Database unavailable");
    }

    #[tokio::test]
    async fn test_bad_request_message() {
        let response = AppError::bad_request("Malformed JSON").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Malformed JSON");
    }
}

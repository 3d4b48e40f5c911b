//! Employee API routes
//!
//! # Route Structure
//!
//! - `POST /api/employees/` - Bulk create employees (bearer token required)
//!
//! # Examples
//!
//! ```rust,ignore
//! use hrsync_server::features::employees::employees_routes;
//!
//! let app = employees_routes()
//!     .route_layer(from_fn_with_state(state.clone(), require_bearer))
//!     .with_state(state);
//! ```

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use hrsync_common::wire::{BulkCreateResponse, ErrorBody, EMPLOYEES_PATH, NO_NEW_EMPLOYEES_MESSAGE};
use serde_json::Value;

use super::commands::{bulk_create, BulkCreateCommand, BulkCreateError, BulkCreateOutcome};
use super::writer::WriteError;
use crate::features::AppState;

pub const CREATED_MESSAGE: &str = "Employees created successfully.";
pub const INVALID_DATA_MESSAGE: &str = "Invalid employee data.";
pub const INTEGRITY_ERROR_MESSAGE: &str = "Integrity error occurred.";
pub const INSERT_FAILED_MESSAGE: &str = "Failed to insert employees.";

pub fn employees_routes() -> Router<AppState> {
    Router::new().route(EMPLOYEES_PATH, post(bulk_create_employees))
}

/// Bulk create employees
///
/// # Request Body
///
/// ```json
/// [
///   {
///     "employee_id": 1,
///     "name": "Ada Lovelace",
///     "email": "ada@example.com",
///     "department": "Engineering",
///     "designation": "Engineer",
///     "salary": 85000.0,
///     "date_of_joining": "2023-01-15"
///   }
/// ]
/// ```
///
/// # Response
///
/// - `201 Created` - At least one record inserted; `skipped` lists duplicates
/// - `400 Bad Request` - Not an array, invalid record, nothing new, or integrity conflict
/// - `401 Unauthorized` - Missing or invalid bearer token
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(state, body))]
async fn bulk_create_employees(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, BulkCreateApiError> {
    let Json(body) = body?;
    let command = BulkCreateCommand::from_json(&body)?;

    let outcome = bulk_create::handle(state.db.clone(), state.insert_chunk_size, command).await?;

    let response = match outcome {
        BulkCreateOutcome::Created { inserted, skipped } => (
            StatusCode::CREATED,
            Json(BulkCreateResponse {
                message: CREATED_MESSAGE.to_string(),
                inserted,
                skipped,
            }),
        ),
        BulkCreateOutcome::NoNewRecords { skipped } => (
            StatusCode::BAD_REQUEST,
            Json(BulkCreateResponse {
                message: NO_NEW_EMPLOYEES_MESSAGE.to_string(),
                inserted: 0,
                skipped,
            }),
        ),
    };

    Ok(response.into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BulkCreateApiError {
    #[error("Malformed JSON body: {0}")]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Command(#[from] BulkCreateError),
}

fn error_response(status: StatusCode, message: &str, error: impl Into<String>) -> Response {
    let body = ErrorBody {
        message: message.to_string(),
        error: Some(error.into()),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for BulkCreateApiError {
    fn into_response(self) -> Response {
        match self {
            BulkCreateApiError::Json(rejection) => {
                error_response(rejection.status(), INVALID_DATA_MESSAGE, rejection.body_text())
            },
            BulkCreateApiError::Command(
                e @ (BulkCreateError::NotAnArray | BulkCreateError::InvalidRecord { .. }),
            ) => error_response(StatusCode::BAD_REQUEST, INVALID_DATA_MESSAGE, e.to_string()),
            BulkCreateApiError::Command(BulkCreateError::Write(
                e @ WriteError::IntegrityViolation(_),
            )) => {
                tracing::warn!(error = %e, "Batch rejected by storage constraint");
                error_response(StatusCode::BAD_REQUEST, INTEGRITY_ERROR_MESSAGE, e.to_string())
            },
            BulkCreateApiError::Command(
                e @ (BulkCreateError::Lookup(_) | BulkCreateError::Write(WriteError::Storage(_))),
            ) => {
                tracing::error!(error = %e, "Database error during bulk create");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INSERT_FAILED_MESSAGE,
                    "A database error occurred",
                )
            },
        }
    }
}

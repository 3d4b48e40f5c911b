//! Database error handling utilities
//!
//! Classifies sqlx errors by the constraint that rejected the statement, so callers can
//! tell a data conflict (a client problem) from a storage failure.
//!
//! # Examples
//!
//! ```rust,ignore
//! use hrsync_server::features::shared::error_helpers::{check_constraint_violation, ConstraintViolation};
//!
//! match check_constraint_violation(err) {
//!     ConstraintViolation::Other(e) => return Err(WriteError::Storage(e)),
//!     violation => return Err(WriteError::IntegrityViolation(violation.to_string())),
//! }
//! ```

use sqlx::error::ErrorKind;
use sqlx::Error as SqlxError;

/// Result of checking for a database constraint violation
#[derive(Debug)]
pub enum ConstraintViolation {
    /// A UNIQUE or PRIMARY KEY constraint was violated
    UniqueViolation(String),
    /// A CHECK or NOT NULL constraint was violated
    CheckViolation(String),
    /// A foreign key constraint was violated
    ForeignKeyViolation(String),
    /// No constraint violation - some other error occurred
    Other(SqlxError),
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintViolation::UniqueViolation(msg)
            | ConstraintViolation::CheckViolation(msg)
            | ConstraintViolation::ForeignKeyViolation(msg) => f.write_str(msg),
            ConstraintViolation::Other(e) => write!(f, "{}", e),
        }
    }
}

/// Check the type of database constraint violation
pub fn check_constraint_violation(error: SqlxError) -> ConstraintViolation {
    if let SqlxError::Database(ref db_err) = error {
        let message = db_err.message().to_string();
        if db_err.is_unique_violation() {
            return ConstraintViolation::UniqueViolation(message);
        }
        if db_err.is_check_violation() || matches!(db_err.kind(), ErrorKind::NotNullViolation) {
            return ConstraintViolation::CheckViolation(message);
        }
        if db_err.is_foreign_key_violation() {
            return ConstraintViolation::ForeignKeyViolation(message);
        }
    }
    ConstraintViolation::Other(error)
}

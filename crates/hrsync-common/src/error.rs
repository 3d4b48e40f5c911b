//! Error types for hrsync record handling

use thiserror::Error;

/// Result type alias for record construction and validation
pub type Result<T> = std::result::Result<T, RecordError>;

/// A raw record could not be turned into an [`EmployeeRecord`](crate::EmployeeRecord)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Record must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl RecordError {
    /// Create an invalid field error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field, if the error concerns one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field) | Self::InvalidField { field, .. } => Some(field),
            Self::NotAnObject(_) => None,
        }
    }
}

//! Wire types shared by the upload client and the server
//!
//! The bulk endpoint speaks plain JSON bodies rather than an envelope, so both sides
//! deserialize exactly these shapes.

use serde::{Deserialize, Serialize};

/// Path of the token exchange endpoint.
pub const TOKEN_PATH: &str = "/api/token/";

/// Path of the bulk employee creation endpoint.
pub const EMPLOYEES_PATH: &str = "/api/employees/";

/// Message returned when every record in a batch already exists.
pub const NO_NEW_EMPLOYEES_MESSAGE: &str = "No new employees to insert.";

/// Credentials sent to the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Successful token exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Opaque bearer token
    pub access: String,
}

/// Which dedup key collided with an existing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    DuplicateId,
    DuplicateEmail,
    DuplicateIdAndEmail,
}

impl SkipReason {
    /// Combine per-key collision flags; `None` when neither key collided
    pub fn from_collisions(id_taken: bool, email_taken: bool) -> Option<Self> {
        match (id_taken, email_taken) {
            (true, true) => Some(Self::DuplicateIdAndEmail),
            (true, false) => Some(Self::DuplicateId),
            (false, true) => Some(Self::DuplicateEmail),
            (false, false) => None,
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::DuplicateId => write!(f, "duplicate employee_id"),
            SkipReason::DuplicateEmail => write!(f, "duplicate email"),
            SkipReason::DuplicateIdAndEmail => write!(f, "duplicate employee_id and email"),
        }
    }
}

/// A record the server declined to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub employee_id: i64,
    pub email: String,
    pub reason: SkipReason,
}

/// Body of `201 Created` and of the "no new employees" `400`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCreateResponse {
    pub message: String,
    #[serde(default)]
    pub inserted: usize,
    #[serde(default)]
    pub skipped: Vec<SkippedRecord>,
}

/// Body of failed bulk requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

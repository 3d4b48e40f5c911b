//! Error types for hrsync CLI
//!
//! User-facing error types with messages that say what went wrong and what to check.
//! Per-batch upload failures are not errors here: they are values collected by the
//! dispatcher and only surface as [`CliError::BatchesFailed`] once the run has settled.

use thiserror::Error;

use crate::auth::AuthError;
use crate::source::SourceError;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Token exchange failed; no batch was sent
    #[error("Authentication failed: {0}. Check the username, password and token URL.")]
    Auth(#[from] AuthError),

    /// The input file could not be opened or is missing columns
    #[error("Cannot read records: {0}")]
    Source(#[from] SourceError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("Network setup failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables, flags or config file.")]
    Config(String),

    /// TOML configuration file has invalid syntax
    #[error("Failed to parse config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The run completed but some batches were not accepted
    #[error("{failed} of {total} batches failed after retries. See the run summary for details.")]
    BatchesFailed { failed: usize, total: usize },

    /// Dry-run validation found rows that would not be sent
    #[error("{invalid} of {total} rows are invalid")]
    InvalidRows { invalid: usize, total: usize },

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = CliError::config("batch_size must be greater than zero");
        let msg = err.to_string();
        assert!(msg.contains("batch_size must be greater than zero"));
        assert!(msg.contains("config file"));
    }

    #[test]
    fn test_batches_failed_message() {
        let err = CliError::BatchesFailed { failed: 2, total: 5 };
        assert!(err.to_string().starts_with("2 of 5 batches failed"));
    }
}

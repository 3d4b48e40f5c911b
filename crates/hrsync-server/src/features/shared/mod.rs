//! Shared utilities for feature modules
//!
//! # Contents
//!
//! - **error_helpers**: Database constraint classification
//! - **test_helpers**: In-memory database and record fixtures (test-only)

pub mod error_helpers;

#[cfg(test)]
pub mod test_helpers;

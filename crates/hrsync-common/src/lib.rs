//! hrsync Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, validation, and logging for the hrsync workspace.
//!
//! # Overview
//!
//! This crate provides the pieces both ends of the ingestion pipeline agree on:
//!
//! - **Employee records**: the [`EmployeeRecord`] unit of transfer and storage, built from
//!   raw text dictionaries (CSV rows) or JSON objects with field-presence checks
//! - **Wire types**: token exchange and bulk-create request/response bodies
//! - **Errors**: the [`RecordError`] validation error shared by client and server
//! - **Logging**: `tracing` subscriber setup used by every binary
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use hrsync_common::{EmployeeRecord, RecordError};
//!
//! fn build(row: &HashMap<String, String>) -> Result<EmployeeRecord, RecordError> {
//!     let record = EmployeeRecord::from_raw(row)?;
//!     println!("{} <{}>", record.name, record.email);
//!     Ok(record)
//! }
//! ```

pub mod employee;
pub mod error;
pub mod logging;
pub mod wire;

// Re-export commonly used types
pub use employee::EmployeeRecord;
pub use error::{RecordError, Result};

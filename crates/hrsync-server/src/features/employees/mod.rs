//! Bulk employee ingestion
//!
//! A request body flows through three steps:
//!
//! 1. [`commands::bulk_create`] parses and validates the JSON array
//! 2. [`dedup`] looks up existing keys and splits the batch into accepted and skipped
//! 3. [`writer`] inserts the accepted records in a single transaction

pub mod commands;
pub mod dedup;
pub mod routes;
pub mod writer;

pub use routes::employees_routes;

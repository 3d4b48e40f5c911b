//! hrsync Server Library
//!
//! HTTP endpoint that receives batches of employee records and stores them.
//!
//! # Overview
//!
//! - **Token exchange**: `POST /api/token/` issues short-lived bearer tokens for the
//!   configured administrator account
//! - **Bulk ingestion**: `POST /api/employees/` validates a JSON array, skips records
//!   whose `employee_id` or `email` already exists, and inserts the rest atomically
//! - **Health**: `GET /health` reports database connectivity
//!
//! # Storage
//!
//! SQLite through sqlx. The table's PRIMARY KEY and UNIQUE constraints are the final
//! word on duplicates: two batches racing on the same key both pass the lookup, and the
//! loser's transaction is rolled back with an integrity error.
//!
//! # Configuration
//!
//! Environment variables (`.env` honoured), see [`config::Config::load`]:
//!
//! - `HRSYNC_HOST` / `HRSYNC_PORT`: bind address (default `127.0.0.1:8000`)
//! - `DATABASE_URL`: SQLite URL (default `sqlite://hrsync.db`)
//! - `HRSYNC_ADMIN_USERNAME` / `HRSYNC_ADMIN_PASSWORD`: token credentials
//! - `HRSYNC_TOKEN_TTL_SECS`: token lifetime
//! - `HRSYNC_INSERT_CHUNK_SIZE`: rows per INSERT statement
//! - `CORS_ALLOWED_ORIGINS`: comma separated origins

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;

pub use config::Config;
pub use error::AppError;

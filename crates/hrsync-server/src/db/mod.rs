//! Database pool and schema
//!
//! SQLite through sqlx. Connections use WAL journaling and a busy timeout, so concurrent
//! batch transactions queue on the write lock instead of failing immediately.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;

/// How long a connection waits on a locked database before failing.
pub const BUSY_TIMEOUT_SECS: u64 = 5;

/// Database setup errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Database configuration is invalid or missing
    #[error("Database configuration error: {0}. Check DATABASE_URL and connection settings.")]
    Config(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// The single table this server owns
const EMPLOYEES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    employee_id     INTEGER PRIMARY KEY,
    name            TEXT    NOT NULL CHECK (length(name) <= 255),
    email           TEXT    NOT NULL UNIQUE,
    department      TEXT    NOT NULL CHECK (length(department) <= 100),
    designation     TEXT    NOT NULL CHECK (length(designation) <= 100),
    salary          REAL    NOT NULL CHECK (salary >= 0),
    date_of_joining TEXT    NOT NULL,
    created_at      TEXT    NOT NULL DEFAULT (datetime('now'))
)
"#;

/// Open a connection pool for `config.url`, creating the database file if needed
pub async fn create_pool(config: &DatabaseConfig) -> DbResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| DbError::Config(format!("invalid DATABASE_URL '{}': {}", config.url, e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Ensure the employees table exists
pub async fn init_schema(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query(EMPLOYEES_SCHEMA).execute(pool).await?;
    Ok(())
}

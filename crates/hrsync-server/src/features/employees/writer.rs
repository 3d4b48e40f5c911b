//! Transactional bulk insert
//!
//! Every record of a batch is inserted inside one transaction. The rows are split into
//! multi-row INSERT statements of `chunk_size` rows to stay under SQLite's bound
//! parameter limit; a failure in any statement rolls back the whole batch.

use std::num::NonZeroUsize;

use hrsync_common::EmployeeRecord;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use crate::features::shared::error_helpers::{check_constraint_violation, ConstraintViolation};

/// Columns written for each record, in bind order
const INSERT_PREFIX: &str = "INSERT INTO employees \
     (employee_id, name, email, department, designation, salary, date_of_joining) ";

/// Bound parameters per inserted row, one per column in [`INSERT_PREFIX`]
pub const BINDS_PER_ROW: usize = 7;

/// SQLite's default `SQLITE_MAX_VARIABLE_NUMBER` (3.32 and later)
pub const SQLITE_MAX_VARIABLES: usize = 32_766;

/// Largest chunk whose INSERT stays within [`SQLITE_MAX_VARIABLES`]
pub const MAX_INSERT_CHUNK_SIZE: usize = SQLITE_MAX_VARIABLES / BINDS_PER_ROW;

#[derive(Debug, Error)]
pub enum WriteError {
    /// A storage constraint rejected a row the dedup pass accepted, usually because a
    /// concurrent batch inserted the same key first
    #[error("Integrity error: {0}")]
    IntegrityViolation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<ConstraintViolation> for WriteError {
    fn from(violation: ConstraintViolation) -> Self {
        match violation {
            ConstraintViolation::Other(e) => WriteError::Storage(e),
            violation => WriteError::IntegrityViolation(violation.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkWriteReport {
    pub inserted: usize,
}

#[derive(Debug, Clone)]
pub struct BulkWriter {
    pool: SqlitePool,
    chunk_size: NonZeroUsize,
}

impl BulkWriter {
    /// `chunk_size` is capped at [`MAX_INSERT_CHUNK_SIZE`]
    pub fn new(pool: SqlitePool, chunk_size: NonZeroUsize) -> Self {
        let max = NonZeroUsize::new(MAX_INSERT_CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            pool,
            chunk_size: chunk_size.min(max),
        }
    }

    /// Insert all `records` atomically
    ///
    /// An empty slice returns immediately without opening a transaction.
    #[tracing::instrument(skip(self, records), fields(records = records.len()))]
    pub async fn write(&self, records: &[EmployeeRecord]) -> Result<BulkWriteReport, WriteError> {
        if records.is_empty() {
            return Ok(BulkWriteReport { inserted: 0 });
        }

        let mut tx = self.pool.begin().await?;

        let total_chunks = records.len().div_ceil(self.chunk_size.get());
        let mut inserted = 0;

        for (chunk_idx, chunk) in records.chunks(self.chunk_size.get()).enumerate() {
            let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(INSERT_PREFIX);
            query_builder.push_values(chunk.iter(), |mut b, record| {
                b.push_bind(record.employee_id)
                    .push_bind(record.name.as_str())
                    .push_bind(record.email.as_str())
                    .push_bind(record.department.as_str())
                    .push_bind(record.designation.as_str())
                    .push_bind(record.salary)
                    .push_bind(record.date_of_joining);
            });

            match query_builder.build().execute(&mut *tx).await {
                Ok(result) => {
                    inserted += result.rows_affected() as usize;
                    tracing::debug!(
                        chunk = chunk_idx + 1,
                        total_chunks,
                        rows = chunk.len(),
                        "Inserted chunk"
                    );
                },
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::warn!(error = %rollback_err, "Rollback failed");
                    }
                    let error = WriteError::from(check_constraint_violation(e));
                    tracing::error!(
                        chunk = chunk_idx + 1,
                        total_chunks,
                        error = %error,
                        "Batch insert rolled back"
                    );
                    return Err(error);
                },
            }
        }

        tx.commit().await?;

        tracing::info!(inserted, "Batch committed");
        Ok(BulkWriteReport { inserted })
    }
}

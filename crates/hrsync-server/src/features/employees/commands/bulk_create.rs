//! Bulk create employees command
//!
//! Parses a JSON array into validated records, skips records whose keys are already
//! stored, and inserts the rest in one transaction.

use std::num::NonZeroUsize;

use hrsync_common::wire::SkippedRecord;
use hrsync_common::{EmployeeRecord, RecordError};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::features::employees::dedup::{fetch_existing_keys, resolve};
use crate::features::employees::writer::{BulkWriter, WriteError};

/// Command to insert a batch of employees
#[derive(Debug, Clone)]
pub struct BulkCreateCommand {
    pub records: Vec<EmployeeRecord>,
}

impl BulkCreateCommand {
    /// Parse a request body
    ///
    /// # Errors
    ///
    /// - [`BulkCreateError::NotAnArray`] when the body is not a JSON array
    /// - [`BulkCreateError::InvalidRecord`] for the first element that fails to parse
    ///   or validate
    pub fn from_json(body: &Value) -> Result<Self, BulkCreateError> {
        let elements = body.as_array().ok_or(BulkCreateError::NotAnArray)?;

        let records = elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                EmployeeRecord::from_json(element)
                    .map_err(|source| BulkCreateError::InvalidRecord { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }
}

/// Successful command outcomes
#[derive(Debug, Clone)]
pub enum BulkCreateOutcome {
    /// At least one record was inserted
    Created {
        inserted: usize,
        skipped: Vec<SkippedRecord>,
    },
    /// Every record already existed, or the batch was empty
    NoNewRecords { skipped: Vec<SkippedRecord> },
}

#[derive(Debug, thiserror::Error)]
pub enum BulkCreateError {
    #[error("Expected a JSON array of employees")]
    NotAnArray,

    #[error("Record at index {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: RecordError,
    },

    #[error("Failed to look up existing employees: {0}")]
    Lookup(#[source] sqlx::Error),

    #[error(transparent)]
    Write(#[from] WriteError),
}

#[tracing::instrument(skip(pool, command), fields(records = command.records.len()))]
pub async fn handle(
    pool: SqlitePool,
    chunk_size: NonZeroUsize,
    command: BulkCreateCommand,
) -> Result<BulkCreateOutcome, BulkCreateError> {
    if command.records.is_empty() {
        tracing::debug!("Empty batch");
        return Ok(BulkCreateOutcome::NoNewRecords {
            skipped: Vec::new(),
        });
    }

    let existing = fetch_existing_keys(&pool, &command.records)
        .await
        .map_err(BulkCreateError::Lookup)?;
    let resolution = resolve(command.records, &existing);

    if resolution.accepted.is_empty() {
        tracing::info!(skipped = resolution.rejected.len(), "No new employees in batch");
        return Ok(BulkCreateOutcome::NoNewRecords {
            skipped: resolution.rejected,
        });
    }

    let report = BulkWriter::new(pool, chunk_size)
        .write(&resolution.accepted)
        .await?;

    tracing::info!(
        inserted = report.inserted,
        skipped = resolution.rejected.len(),
        "Employees created"
    );

    Ok(BulkCreateOutcome::Created {
        inserted: report.inserted,
        skipped: resolution.rejected,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{count_employees, employee, memory_pool};
    use hrsync_common::wire::SkipReason;
    use serde_json::json;

    fn chunk() -> NonZeroUsize {
        NonZeroUsize::new(500).unwrap()
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        let err = BulkCreateCommand::from_json(&json!({"employee_id": 1})).unwrap_err();
        assert!(matches!(err, BulkCreateError::NotAnArray));
    }

    #[test]
    fn test_from_json_names_bad_index() {
        let body = json!([
            serde_json::to_value(employee(1)).unwrap(),
            {"employee_id": 2, "name": "B"}
        ]);

        let err = BulkCreateCommand::from_json(&body).unwrap_err();
        match err {
            BulkCreateError::InvalidRecord { index, source } => {
                assert_eq!(index, 1);
                assert!(source.field().is_some());
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_opens_no_transaction() {
        let pool = memory_pool().await;
        let outcome = handle(pool, chunk(), BulkCreateCommand { records: vec![] })
            .await
            .unwrap();
        assert!(matches!(outcome, BulkCreateOutcome::NoNewRecords { ref skipped } if skipped.is_empty()));
    }

    #[tokio::test]
    async fn test_partial_duplicate_batch() {
        let pool = memory_pool().await;
        let mut existing = employee(100);
        existing.email = employee(2).email;
        BulkWriter::new(pool.clone(), chunk())
            .write(&[existing])
            .await
            .unwrap();

        let command = BulkCreateCommand {
            records: vec![employee(1), employee(2), employee(3)],
        };
        let outcome = handle(pool.clone(), chunk(), command).await.unwrap();

        match outcome {
            BulkCreateOutcome::Created { inserted, skipped } => {
                assert_eq!(inserted, 2);
                assert_eq!(skipped.len(), 1);
                assert_eq!(skipped[0].employee_id, 2);
                assert_eq!(skipped[0].reason, SkipReason::DuplicateEmail);
            },
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(count_employees(&pool).await, 3);
    }

    #[tokio::test]
    async fn test_all_duplicates() {
        let pool = memory_pool().await;
        let records: Vec<EmployeeRecord> = (1..=3).map(employee).collect();
        handle(pool.clone(), chunk(), BulkCreateCommand { records: records.clone() })
            .await
            .unwrap();

        let outcome = handle(pool, chunk(), BulkCreateCommand { records })
            .await
            .unwrap();

        match outcome {
            BulkCreateOutcome::NoNewRecords { skipped } => assert_eq!(skipped.len(), 3),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}

//! Duplicate detection against stored employees
//!
//! Existing keys are fetched in one pass per lookup chunk, then [`resolve`] splits the
//! batch without touching the database. Email comparison is exact, matching the
//! table's UNIQUE constraint.

use std::collections::HashSet;

use hrsync_common::wire::{SkipReason, SkippedRecord};
use hrsync_common::EmployeeRecord;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

/// Candidates per lookup query; each contributes two bound parameters
pub const LOOKUP_CHUNK_SIZE: usize = 500;

/// Keys already present in storage that intersect a candidate batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingKeys {
    pub ids: HashSet<i64>,
    pub emails: HashSet<String>,
}

/// Outcome of deduplicating one batch
///
/// `accepted` and `rejected` together hold every candidate exactly once.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub accepted: Vec<EmployeeRecord>,
    pub rejected: Vec<SkippedRecord>,
}

/// Look up which of the candidates' ids and emails are already stored
#[tracing::instrument(skip(pool, candidates), fields(candidates = candidates.len()))]
pub async fn fetch_existing_keys(
    pool: &SqlitePool,
    candidates: &[EmployeeRecord],
) -> Result<ExistingKeys, sqlx::Error> {
    let mut existing = ExistingKeys::default();

    for chunk in candidates.chunks(LOOKUP_CHUNK_SIZE) {
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT employee_id, email FROM employees WHERE employee_id IN (");

        let mut separated = query_builder.separated(", ");
        for record in chunk {
            separated.push_bind(record.employee_id);
        }
        separated.push_unseparated(") OR email IN (");

        let mut separated = query_builder.separated(", ");
        for record in chunk {
            separated.push_bind(record.email.as_str());
        }
        separated.push_unseparated(")");

        let rows = query_builder.build().fetch_all(pool).await?;
        for row in rows {
            existing.ids.insert(row.try_get("employee_id")?);
            existing.emails.insert(row.try_get("email")?);
        }
    }

    tracing::debug!(
        existing_ids = existing.ids.len(),
        existing_emails = existing.emails.len(),
        "Fetched existing keys"
    );

    Ok(existing)
}

/// Split candidates into records safe to insert and records to skip
///
/// A candidate is skipped when its id or email is already stored, or when an earlier
/// candidate in the same batch was accepted with that id or email. Order within each
/// side follows the input.
pub fn resolve(candidates: Vec<EmployeeRecord>, existing: &ExistingKeys) -> Resolution {
    let mut resolution = Resolution::default();
    let mut seen_ids: HashSet<i64> = HashSet::new();
    let mut seen_emails: HashSet<String> = HashSet::new();

    for record in candidates {
        let id_taken =
            existing.ids.contains(&record.employee_id) || seen_ids.contains(&record.employee_id);
        let email_taken =
            existing.emails.contains(&record.email) || seen_emails.contains(&record.email);

        match SkipReason::from_collisions(id_taken, email_taken) {
            Some(reason) => resolution.rejected.push(SkippedRecord {
                employee_id: record.employee_id,
                email: record.email,
                reason,
            }),
            None => {
                seen_ids.insert(record.employee_id);
                seen_emails.insert(record.email.clone());
                resolution.accepted.push(record);
            },
        }
    }

    resolution
}

//! Test helpers and fixtures for database tests

use chrono::NaiveDate;
use hrsync_common::EmployeeRecord;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::db::init_schema;

/// A fresh in-memory database with the schema applied
///
/// One connection that never expires, since every in-memory connection is its own
/// database.
#[allow(clippy::expect_used)]
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&pool).await.expect("schema");
    pool
}

/// A valid employee with id-derived unique fields
pub fn employee(id: i64) -> EmployeeRecord {
    EmployeeRecord {
        employee_id: id,
        name: format!("Employee {}", id),
        email: format!("employee{}@example.com", id),
        department: "Engineering".to_string(),
        designation: "Engineer".to_string(),
        salary: 50_000.0 + id as f64,
        date_of_joining: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default(),
    }
}

/// Number of rows in the employees table
#[allow(clippy::expect_used)]
pub async fn count_employees(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await
        .expect("count");
    count
}

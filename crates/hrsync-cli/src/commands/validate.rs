//! `hrsync validate` command implementation
//!
//! Dry run: parse and validate every row without contacting the server.

use std::path::Path;

use colored::Colorize;

use crate::error::{CliError, Result};
use crate::source::RecordSource;

/// Validate a file and list the rows that would not be sent
pub async fn run(file: &Path) -> Result<()> {
    let loaded = RecordSource::new(file).load()?;

    println!(
        "{} {} rows read, {} valid, {} invalid",
        "Validation:".cyan().bold(),
        loaded.rows_read,
        loaded.records.len(),
        loaded.invalid.len()
    );

    if loaded.invalid.is_empty() {
        println!("{}", "All rows are valid.".green());
        return Ok(());
    }

    for row in &loaded.invalid {
        println!("  line {}: {}", row.line, row.error);
    }

    Err(CliError::InvalidRows {
        invalid: loaded.invalid.len(),
        total: loaded.rows_read,
    })
}

//! End-of-run summary
//!
//! Aggregates batch outcomes and source statistics into a [`RunSummary`], and renders it
//! for the terminal.

use std::time::Duration;

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use crate::dispatcher::BatchOutcome;
use crate::progress::format_elapsed;
use crate::source::InvalidRow;
use crate::upload::{AttemptError, UploadResult};

/// A batch that was not accepted, with its last error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedBatch {
    pub index: usize,
    pub records: usize,
    pub attempts: u32,
    pub last_error: AttemptError,
}

/// Totals for one upload run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Data rows read from the file
    pub records_read: usize,
    /// Rows rejected before upload
    pub invalid_rows: Vec<InvalidRow>,
    pub batches: usize,
    /// Records sent in any batch
    pub attempted: usize,
    /// Records in batches the server acknowledged
    pub succeeded: usize,
    /// Records in batches that failed after retries
    pub failed: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub failed_batches: Vec<FailedBatch>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Fold batch outcomes into totals
    pub fn aggregate(outcomes: &[BatchOutcome]) -> Self {
        let mut summary = Self {
            batches: outcomes.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            summary.attempted += outcome.records;
            match &outcome.result {
                UploadResult::Succeeded(ack) => {
                    summary.succeeded += outcome.records;
                    summary.inserted += ack.inserted;
                    summary.skipped += ack.skipped;
                },
                UploadResult::FailedAfterRetries(failure) => {
                    summary.failed += outcome.records;
                    summary.failed_batches.push(FailedBatch {
                        index: outcome.index,
                        records: outcome.records,
                        attempts: failure.attempts,
                        last_error: failure.last_error.clone(),
                    });
                },
            }
        }

        summary.failed_batches.sort_by_key(|b| b.index);
        summary
    }

    /// Attach what the record source reported
    pub fn with_source(mut self, records_read: usize, invalid_rows: Vec<InvalidRow>) -> Self {
        self.records_read = records_read;
        self.invalid_rows = invalid_rows;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// True when every batch was acknowledged
    pub fn is_success(&self) -> bool {
        self.failed_batches.is_empty()
    }

    /// Render the summary table plus invalid rows and failed batches
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Metric", "Value"]);

        table.add_row(vec!["Rows read".to_string(), self.records_read.to_string()]);
        table.add_row(vec!["Invalid rows".to_string(), self.invalid_rows.len().to_string()]);
        table.add_row(vec!["Batches".to_string(), self.batches.to_string()]);
        table.add_row(vec!["Records attempted".to_string(), self.attempted.to_string()]);
        table.add_row(vec!["Records succeeded".to_string(), self.succeeded.to_string()]);
        table.add_row(vec!["Records failed".to_string(), self.failed.to_string()]);
        table.add_row(vec!["Inserted".to_string(), self.inserted.to_string()]);
        table.add_row(vec!["Skipped (duplicates)".to_string(), self.skipped.to_string()]);
        table.add_row(vec!["Elapsed".to_string(), format_elapsed(self.elapsed)]);

        let mut out = String::new();
        let title = if self.is_success() {
            "Upload complete".green().bold()
        } else {
            "Upload finished with failures".red().bold()
        };
        out.push_str(&format!("{}\n{}\n", title, table));

        if !self.invalid_rows.is_empty() {
            out.push_str(&format!("\n{}\n", "Invalid rows (not sent):".yellow()));
            for row in &self.invalid_rows {
                out.push_str(&format!("  line {}: {}\n", row.line, row.error));
            }
        }

        if !self.failed_batches.is_empty() {
            out.push_str(&format!("\n{}\n", "Failed batches:".red()));
            for batch in &self.failed_batches {
                out.push_str(&format!(
                    "  batch {} ({} records, {} attempts): {}\n",
                    batch.index, batch.records, batch.attempts, batch.last_error
                ));
            }
        }

        out
    }
}

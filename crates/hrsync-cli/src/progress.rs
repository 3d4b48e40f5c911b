//! Progress bar utilities for CLI operations
//!
//! Bars draw to stderr so they never mix with the summary printed on stdout.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const BATCH_TEMPLATE: &str =
    "{msg} {spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} batches ({eta})";

/// Create a progress bar counting settled batches
///
/// Returns a hidden bar when stderr is not a terminal.
pub fn create_batch_progress(total: u64, message: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
    let style = ProgressStyle::default_bar()
        .template(BATCH_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Format a duration as seconds with millisecond precision
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}

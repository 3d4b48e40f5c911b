//! `hrsync upload` command implementation
//!
//! Read, authenticate once, partition, dispatch, report.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::auth::Authenticator;
use crate::batcher::{partition, Batch};
use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{CliError, Result};
use crate::progress::create_batch_progress;
use crate::report::RunSummary;
use crate::source::RecordSource;
use crate::upload::UploadWorker;

/// Upload a file and print the run summary
///
/// Fails when any batch failed, after the summary has been printed.
pub async fn run(file: &Path, config: &ClientConfig) -> Result<()> {
    let summary = execute(file, config).await?;
    println!("{}", summary.render());

    if summary.is_success() {
        Ok(())
    } else {
        Err(CliError::BatchesFailed {
            failed: summary.failed_batches.len(),
            total: summary.batches,
        })
    }
}

/// Run the upload pipeline and return its summary
///
/// Authentication and source errors abort the run before any batch is sent; batch
/// failures are reported in the summary instead.
pub async fn execute(file: &Path, config: &ClientConfig) -> Result<RunSummary> {
    let started = Instant::now();
    let credentials = config.credentials()?;
    if let Some(warning) = config.batch_size_warning() {
        warn!("{}", warning);
    }

    let loaded = RecordSource::new(file).load()?;
    info!(
        file = %file.display(),
        rows = loaded.rows_read,
        valid = loaded.records.len(),
        invalid = loaded.invalid.len(),
        "Loaded records"
    );
    if !loaded.invalid.is_empty() {
        warn!(count = loaded.invalid.len(), "Invalid rows will not be sent");
    }

    if loaded.records.is_empty() {
        warn!("No valid records to upload");
        return Ok(RunSummary::default()
            .with_source(loaded.rows_read, loaded.invalid)
            .with_elapsed(started.elapsed()));
    }

    let api = ApiClient::from_config(config)?;
    let token = Authenticator::new(api.clone())
        .authenticate(&credentials)
        .await?;

    let batches: Vec<Batch> = partition(loaded.records, config.batch_size).collect();
    info!(
        batches = batches.len(),
        batch_size = config.batch_size.get(),
        "Dispatching batches"
    );

    let progress = create_batch_progress(batches.len() as u64, "Uploading");
    let dispatcher =
        Dispatcher::new(UploadWorker::new(api, config.retry_policy())).with_progress(progress);
    let outcomes = dispatcher.run(batches, &token).await;

    Ok(RunSummary::aggregate(&outcomes)
        .with_source(loaded.rows_read, loaded.invalid)
        .with_elapsed(started.elapsed()))
}

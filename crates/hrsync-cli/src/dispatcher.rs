//! Concurrent batch dispatch
//!
//! Every batch becomes its own tokio task sharing one [`UploadWorker`] (and through it
//! one HTTP connection pool). All tasks are awaited together; a failed or panicked task
//! is turned into a failed outcome for its batch, so every batch yields exactly one
//! [`BatchOutcome`].

use std::sync::Arc;

use futures::future::join_all;
use indicatif::ProgressBar;
use tracing::{error, info, instrument};

use crate::auth::BearerToken;
use crate::batcher::Batch;
use crate::upload::{AttemptError, UploadFailure, UploadResult, UploadWorker};

/// Result of one batch, tagged with its position in the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub index: usize,
    /// Records in the batch
    pub records: usize,
    pub result: UploadResult,
}

/// Fans batches out to concurrent upload tasks
pub struct Dispatcher {
    worker: Arc<UploadWorker>,
    progress: Option<ProgressBar>,
}

impl Dispatcher {
    pub fn new(worker: UploadWorker) -> Self {
        Self {
            worker: Arc::new(worker),
            progress: None,
        }
    }

    /// Advance `progress` once per settled batch
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Upload every batch concurrently and wait for all of them
    ///
    /// Outcomes are returned in batch order.
    #[instrument(skip_all, fields(batches = batches.len()))]
    pub async fn run(&self, batches: Vec<Batch>, token: &BearerToken) -> Vec<BatchOutcome> {
        let mut meta = Vec::with_capacity(batches.len());
        let mut handles = Vec::with_capacity(batches.len());

        for batch in batches {
            meta.push((batch.index, batch.len()));

            let worker = Arc::clone(&self.worker);
            let token = token.clone();
            let progress = self.progress.clone();
            handles.push(tokio::spawn(async move {
                let result = worker.upload(&batch, &token).await;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                result
            }));
        }

        let joined = join_all(handles).await;

        let outcomes: Vec<BatchOutcome> = meta
            .into_iter()
            .zip(joined)
            .map(|((index, records), joined)| {
                let result = joined.unwrap_or_else(|join_err| {
                    error!(batch = index, error = %join_err, "Upload task did not complete");
                    UploadResult::FailedAfterRetries(UploadFailure {
                        attempts: 0,
                        last_error: AttemptError::Aborted(join_err.to_string()),
                    })
                });
                BatchOutcome {
                    index,
                    records,
                    result,
                }
            })
            .collect();

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        let failed = outcomes.iter().filter(|o| !o.result.is_success()).count();
        info!(total = outcomes.len(), failed, "All batches settled");

        outcomes
    }
}

//! Per-batch upload with bounded retry
//!
//! An [`UploadWorker`] sends one batch as one request. Transport failures and non-2xx
//! responses are retried up to `max_retries` more times, with a non-blocking sleep
//! between attempts. The outcome is always a value: a worker never returns an error.
//!
//! A transport failure may hide a batch the server already committed. If a later attempt
//! is answered with "no new employees", the batch counts as delivered with every record
//! skipped.

use std::fmt;
use std::time::Duration;

use hrsync_common::wire::{BulkCreateResponse, NO_NEW_EMPLOYEES_MESSAGE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::api::ApiClient;
use crate::auth::BearerToken;
use crate::batcher::Batch;

// ============================================================================
// Retry Policy
// ============================================================================

/// How the delay between attempts grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RetryStrategy {
    /// Same delay before every retry
    #[default]
    Constant,
    /// Delay multiplied by the number of the attempt that just failed
    Linear,
}

impl fmt::Display for RetryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryStrategy::Constant => write!(f, "constant"),
            RetryStrategy::Linear => write!(f, "linear"),
        }
    }
}

/// Bounded retry settings for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one
    pub max_retries: u32,
    pub delay: Duration,
    pub strategy: RetryStrategy,
}

impl RetryPolicy {
    /// Total attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after `attempt` (1-based) failed
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.strategy {
            RetryStrategy::Constant => self.delay,
            RetryStrategy::Linear => self.delay.saturating_mul(attempt.max(1)),
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// The last thing that went wrong for a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// No response: connection refused, timeout, reset
    Transport(String),
    /// Non-2xx response
    ServerRejection { status: u16, body: String },
    /// The upload task did not run to completion
    Aborted(String),
}

impl AttemptError {
    /// Whether the server refused the batch because every record already exists
    pub fn is_no_new_records(&self) -> bool {
        match self {
            AttemptError::ServerRejection { status: 400, body } => {
                serde_json::from_str::<BulkCreateResponse>(body)
                    .is_ok_and(|parsed| parsed.message == NO_NEW_EMPLOYEES_MESSAGE)
            },
            _ => false,
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Transport(msg) => write!(f, "transport error: {}", msg),
            AttemptError::ServerRejection { status, body } => {
                write!(f, "server responded {}: {}", status, body)
            },
            AttemptError::Aborted(msg) => write!(f, "upload task aborted: {}", msg),
        }
    }
}

/// Server acknowledgement of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAck {
    /// Records sent in the batch
    pub records: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub attempts: u32,
}

/// A batch that was not accepted within the retry limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub attempts: u32,
    pub last_error: AttemptError,
}

/// Outcome of uploading one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Succeeded(BatchAck),
    FailedAfterRetries(UploadFailure),
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Succeeded(_))
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Sends batches with retry; shared by every task of a run
pub struct UploadWorker {
    api: ApiClient,
    policy: RetryPolicy,
}

impl UploadWorker {
    pub fn new(api: ApiClient, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    /// Upload one batch, retrying until it is accepted or attempts run out
    #[instrument(skip_all, fields(batch = batch.index, records = batch.len()))]
    pub async fn upload(&self, batch: &Batch, token: &BearerToken) -> UploadResult {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;
        // Set once an attempt failed without a response
        let mut maybe_delivered = false;

        loop {
            debug!(attempt, max_attempts, "Sending batch");

            match self.send(batch, token).await {
                Ok(body) => {
                    let (inserted, skipped) = body
                        .map(|b| (b.inserted, b.skipped.len()))
                        .unwrap_or_default();
                    info!(attempt, inserted, skipped, "Batch accepted");
                    return UploadResult::Succeeded(BatchAck {
                        records: batch.len(),
                        inserted,
                        skipped,
                        attempts: attempt,
                    });
                },
                Err(err) if maybe_delivered && err.is_no_new_records() => {
                    info!(attempt, "Batch was stored by an earlier unanswered attempt");
                    return UploadResult::Succeeded(BatchAck {
                        records: batch.len(),
                        inserted: 0,
                        skipped: batch.len(),
                        attempts: attempt,
                    });
                },
                Err(err) if attempt >= max_attempts => {
                    error!(attempt, error = %err, "Batch failed after retries");
                    return UploadResult::FailedAfterRetries(UploadFailure {
                        attempts: attempt,
                        last_error: err,
                    });
                },
                Err(err) => {
                    maybe_delivered |= matches!(err, AttemptError::Transport(_));
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Batch upload attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
            }
        }
    }

    /// One attempt; `Ok(None)` is a 2xx whose body was not understood
    async fn send(
        &self,
        batch: &Batch,
        token: &BearerToken,
    ) -> Result<Option<BulkCreateResponse>, AttemptError> {
        let response = self
            .api
            .post_batch(&batch.records, token.as_str())
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(AttemptError::ServerRejection {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<BulkCreateResponse>(&body) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "Unrecognised success body");
                Ok(None)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hrsync_common::EmployeeRecord;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::from_millis(5),
            strategy: RetryStrategy::Constant,
        }
    }

    fn batch(n: i64) -> Batch {
        let records = (1..=n)
            .map(|i| EmployeeRecord {
                employee_id: i,
                name: format!("Employee {i}"),
                email: format!("e{i}@example.com"),
                department: "Ops".to_string(),
                designation: "Clerk".to_string(),
                salary: 1000.0,
                date_of_joining: NaiveDate::from_ymd_opt(2022, 5, 1).unwrap(),
            })
            .collect();
        Batch { index: 0, records }
    }

    fn worker(server: &MockServer, max_retries: u32) -> UploadWorker {
        worker_with_timeout(server, max_retries, Duration::from_secs(5))
    }

    fn worker_with_timeout(
        server: &MockServer,
        max_retries: u32,
        timeout: Duration,
    ) -> UploadWorker {
        let api = ApiClient::new(
            format!("{}/api/token/", server.uri()),
            format!("{}/api/employees/", server.uri()),
            timeout,
        )
        .unwrap();
        UploadWorker::new(api, policy(max_retries))
    }

    fn no_new_employees() -> ResponseTemplate {
        ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "No new employees to insert.", "skipped": []
        }))
    }

    #[test]
    fn test_delay_strategies() {
        let constant = policy(3);
        assert_eq!(constant.delay_after(1), Duration::from_millis(5));
        assert_eq!(constant.delay_after(3), Duration::from_millis(5));

        let linear = RetryPolicy {
            strategy: RetryStrategy::Linear,
            ..constant
        };
        assert_eq!(linear.delay_after(1), Duration::from_millis(5));
        assert_eq!(linear.delay_after(3), Duration::from_millis(15));
        assert_eq!(linear.max_attempts(), 4);
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/employees/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "message": "Employees created",
                "inserted": 2,
                "skipped": [{"employee_id": 3, "email": "e3@example.com", "reason": "duplicate_email"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = worker(&server, 3).upload(&batch(3), &BearerToken::new("t")).await;
        assert_eq!(
            result,
            UploadResult::Succeeded(BatchAck {
                records: 3,
                inserted: 2,
                skipped: 1,
                attempts: 1
            })
        );
    }

    #[tokio::test]
    async fn test_always_failing_server_sees_max_retries_plus_one_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(4)
            .mount(&server)
            .await;

        let result = worker(&server, 3).upload(&batch(1), &BearerToken::new("t")).await;
        assert_eq!(
            result,
            UploadResult::FailedAfterRetries(UploadFailure {
                attempts: 4,
                last_error: AttemptError::ServerRejection {
                    status: 500,
                    body: "boom".to_string()
                },
            })
        );
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "message": "ok", "inserted": 1, "skipped": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = worker(&server, 3).upload(&batch(1), &BearerToken::new("t")).await;
        match result {
            UploadResult::Succeeded(ack) => assert_eq!(ack.attempts, 3),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "message": "No new employees to insert.", "skipped": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = worker(&server, 0).upload(&batch(1), &BearerToken::new("t")).await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_already_stored_after_timeout_counts_as_delivered() {
        let server = MockServer::start().await;
        // First attempt commits server-side but the response arrives too late
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({
                        "message": "ok", "inserted": 2, "skipped": []
                    }))
                    .set_delay(Duration::from_millis(500)),
            )
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(no_new_employees())
            .expect(1)
            .mount(&server)
            .await;

        let result = worker_with_timeout(&server, 3, Duration::from_millis(100))
            .upload(&batch(2), &BearerToken::new("t"))
            .await;

        assert_eq!(
            result,
            UploadResult::Succeeded(BatchAck {
                records: 2,
                inserted: 0,
                skipped: 2,
                attempts: 2
            })
        );
    }

    #[tokio::test]
    async fn test_no_new_employees_without_lost_attempt_still_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(no_new_employees())
            .expect(2)
            .mount(&server)
            .await;

        let result = worker(&server, 2).upload(&batch(1), &BearerToken::new("t")).await;

        match result {
            UploadResult::FailedAfterRetries(failure) => {
                assert_eq!(failure.attempts, 3);
                assert!(failure.last_error.is_no_new_records());
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_retried_then_reported() {
        let api = ApiClient::new(
            "http://127.0.0.1:1/api/token/",
            "http://127.0.0.1:1/api/employees/",
            Duration::from_secs(2),
        )
        .unwrap();
        let worker = UploadWorker::new(api, policy(1));

        match worker.upload(&batch(1), &BearerToken::new("t")).await {
            UploadResult::FailedAfterRetries(failure) => {
                assert_eq!(failure.attempts, 2);
                assert!(matches!(failure.last_error, AttemptError::Transport(_)));
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_with_unrecognised_body_still_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("created"))
            .mount(&server)
            .await;

        let result = worker(&server, 3).upload(&batch(2), &BearerToken::new("t")).await;
        match result {
            UploadResult::Succeeded(ack) => {
                assert_eq!(ack.records, 2);
                assert_eq!(ack.inserted, 0);
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

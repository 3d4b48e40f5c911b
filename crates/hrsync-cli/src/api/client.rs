//! HTTP API client for the hrsync server
//!
//! Thin wrapper over a shared [`reqwest::Client`]. It returns raw responses so callers
//! decide which statuses count as success; cloning shares the connection pool.

use std::time::Duration;

use hrsync_common::wire::TokenRequest;
use hrsync_common::EmployeeRecord;
use reqwest::{Client, Response};

use crate::config::ClientConfig;
use crate::error::Result;

/// API client for the token and bulk employee endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    token_url: String,
    employees_url: String,
}

impl ApiClient {
    /// Create a new API client with a per-request timeout
    pub fn new(
        token_url: impl Into<String>,
        employees_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            token_url: token_url.into(),
            employees_url: employees_url.into(),
        })
    }

    /// Create from resolved configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            config.token_url.clone(),
            config.employees_url.clone(),
            config.request_timeout,
        )
    }

    /// Token endpoint URL (used as a tracing span field)
    pub(crate) fn token_url(&self) -> &str {
        &self.token_url
    }

    /// POST credentials to the token endpoint
    pub async fn request_token(&self, request: &TokenRequest) -> reqwest::Result<Response> {
        self.client.post(&self.token_url).json(request).send().await
    }

    /// POST one batch of records as a JSON array with bearer authentication
    pub async fn post_batch(
        &self,
        records: &[EmployeeRecord],
        token: &str,
    ) -> reqwest::Result<Response> {
        self.client
            .post(&self.employees_url)
            .bearer_auth(token)
            .json(records)
            .send()
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_request_token_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(
            format!("{}/api/token/", server.uri()),
            format!("{}/api/employees/", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();

        let request = TokenRequest {
            username: "admin".to_string(),
            password: "pw".to_string(),
        };
        let response = client.request_token(&request).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["username"], "admin");
    }

    #[tokio::test]
    async fn test_post_batch_sends_bearer_and_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/employees/"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(
            format!("{}/api/token/", server.uri()),
            format!("{}/api/employees/", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();

        let response = client.post_batch(&[], "tok-1").await.unwrap();
        assert_eq!(response.status().as_u16(), 201);

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert!(body.is_array());
    }
}

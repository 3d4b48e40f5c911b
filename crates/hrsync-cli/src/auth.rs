//! Token exchange
//!
//! One token is fetched per run and shared by every batch. Any failure here is fatal to
//! the run: no batch is sent without a token. There is no refresh, so a token that
//! expires mid-run turns the remaining attempts into `401` rejections.

use std::fmt;

use hrsync_common::wire::{TokenRequest, TokenResponse};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::ApiClient;

/// Why the token exchange failed
#[derive(Error, Debug)]
pub enum AuthError {
    /// The token endpoint answered with a non-success status
    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The request never produced a response
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response without a usable token
    #[error("token response is malformed: {0}")]
    MalformedResponse(String),
}

/// Username and password for the token endpoint
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn to_request(&self) -> TokenRequest {
        TokenRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Bearer credential attached to every batch request
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Exchanges credentials for a bearer token
pub struct Authenticator {
    api: ApiClient,
}

impl Authenticator {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Perform the single token exchange of a run
    #[instrument(skip_all, fields(username = %credentials.username(), url = %self.api.token_url()))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<BearerToken, AuthError> {
        let response = self.api.request_token(&credentials.to_request()).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        if token.access.trim().is_empty() {
            return Err(AuthError::MalformedResponse("empty access token".to_string()));
        }

        debug!("Obtained bearer token");
        Ok(BearerToken::new(token.access))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn authenticator(server: &MockServer) -> Authenticator {
        let api = ApiClient::new(
            format!("{}/api/token/", server.uri()),
            format!("{}/api/employees/", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();
        Authenticator::new(api)
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .and(body_json(serde_json::json!({"username": "admin", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"access": "abc"})))
            .expect(1)
            .mount(&server)
            .await;

        let token = authenticator(&server)
            .authenticate(&Credentials::new("admin", "pw"))
            .await
            .unwrap();
        assert_eq!(token.as_str(), "abc");
    }

    #[tokio::test]
    async fn test_authenticate_rejected_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{\"detail\":\"bad credentials\"}"))
            .mount(&server)
            .await;

        let err = authenticator(&server)
            .authenticate(&Credentials::new("admin", "wrong"))
            .await
            .unwrap_err();
        match err {
            AuthError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad credentials"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = authenticator(&server)
            .authenticate(&Credentials::new("admin", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_authenticate_transport_failure() {
        let api = ApiClient::new(
            "http://127.0.0.1:1/api/token/",
            "http://127.0.0.1:1/api/employees/",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = Authenticator::new(api)
            .authenticate(&Credentials::new("admin", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(!creds.contains("hunter2"));
        assert!(!format!("{:?}", BearerToken::new("s3cr3t")).contains("s3cr3t"));
    }
}

//! Configuration for upload runs
//!
//! A [`ClientConfig`] is resolved once per invocation and passed by value into the
//! authenticator, worker and dispatcher. Sources, lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. the optional TOML file given with `--config`
//! 3. `HRSYNC_*` environment variables (`.env` is loaded first)
//! 4. command-line flags
//!
//! Layers 3 and 4 arrive together in [`ConfigOverrides`], since clap reads each flag's
//! environment variable when the flag itself is absent.

use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::api::endpoints;
use crate::auth::Credentials;
use crate::error::{CliError, Result};
use crate::upload::{RetryPolicy, RetryStrategy};
use crate::ConfigOverrides;

// ============================================================================
// Client Configuration Constants
// ============================================================================

/// Server base URL used when no endpoint is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Records per request.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Largest batch that stays well inside the server's default 2 MB request
/// body limit; bigger batches risk a 413 that no retry can fix.
pub const RECOMMENDED_MAX_BATCH_SIZE: usize = 5_000;

/// Additional attempts after the first failed request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay between attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;

/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shape of the TOML configuration file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server_url: Option<String>,
    pub token_url: Option<String>,
    pub employees_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub batch_size: Option<usize>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub retry_strategy: Option<RetryStrategy>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read config file '{}': {}", path.display(), e))
        })?;
        Ok(toml::from_str(&text)?)
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub token_url: String,
    pub employees_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub batch_size: NonZeroUsize,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub retry_strategy: RetryStrategy,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Resolve configuration from an optional file plus flag/environment overrides
    ///
    /// An explicit endpoint URL at any layer wins over one derived from a server URL.
    pub fn resolve(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let file = match config_file {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(file, overrides.clone())
    }

    fn merge(file: FileConfig, cli: ConfigOverrides) -> Result<Self> {
        let server_url = cli
            .server_url
            .or(file.server_url)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let token_url = cli
            .token_url
            .or(file.token_url)
            .unwrap_or_else(|| endpoints::token_url(&server_url));
        let employees_url = cli
            .employees_url
            .or(file.employees_url)
            .unwrap_or_else(|| endpoints::employees_url(&server_url));

        let batch_size = cli.batch_size.or(file.batch_size).unwrap_or(DEFAULT_BATCH_SIZE);
        let batch_size = NonZeroUsize::new(batch_size)
            .ok_or_else(|| CliError::config("batch_size must be greater than zero"))?;

        let request_timeout_secs = cli
            .request_timeout_secs
            .or(file.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(CliError::config("request_timeout_secs must be greater than zero"));
        }

        let config = Self {
            token_url,
            employees_url,
            username: cli.username.or(file.username),
            password: cli.password.or(file.password),
            batch_size,
            max_retries: cli.max_retries.or(file.max_retries).unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay: Duration::from_millis(
                cli.retry_delay_ms
                    .or(file.retry_delay_ms)
                    .unwrap_or(DEFAULT_RETRY_DELAY_MS),
            ),
            retry_strategy: cli.retry_strategy.or(file.retry_strategy).unwrap_or_default(),
            request_timeout: Duration::from_secs(request_timeout_secs),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, url) in [("token_url", &self.token_url), ("employees_url", &self.employees_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CliError::config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    key, url
                )));
            }
        }
        Ok(())
    }

    /// Credentials for the token exchange; both parts are required for uploads
    pub fn credentials(&self) -> Result<Credentials> {
        let username = self
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CliError::config("username is required (--username or HRSYNC_USERNAME)"))?;
        let password = self
            .password
            .clone()
            .ok_or_else(|| CliError::config("password is required (--password or HRSYNC_PASSWORD)"))?;
        Ok(Credentials::new(username, password))
    }

    /// Retry policy handed to each upload worker
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: self.retry_delay,
            strategy: self.retry_strategy,
        }
    }

    /// Warning text when the batch size risks exceeding the server body limit
    pub fn batch_size_warning(&self) -> Option<String> {
        let size = self.batch_size.get();
        (size > RECOMMENDED_MAX_BATCH_SIZE).then(|| {
            format!(
                "batch_size {} exceeds {}; requests may be rejected with 413 Payload Too Large",
                size, RECOMMENDED_MAX_BATCH_SIZE
            )
        })
    }

    /// Key/value pairs for display, with the password redacted
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("token_url", self.token_url.clone()),
            ("employees_url", self.employees_url.clone()),
            ("username", self.username.clone().unwrap_or_else(|| "(unset)".to_string())),
            (
                "password",
                match self.password {
                    Some(_) => "********".to_string(),
                    None => "(unset)".to_string(),
                },
            ),
            ("batch_size", self.batch_size.to_string()),
            ("max_retries", self.max_retries.to_string()),
            ("retry_delay_ms", self.retry_delay.as_millis().to_string()),
            ("retry_strategy", self.retry_strategy.to_string()),
            ("request_timeout_secs", self.request_timeout.as_secs().to_string()),
        ]
    }
}

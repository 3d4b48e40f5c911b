//! hrsync CLI Library
//!
//! Bulk upload of employee records from a CSV file to an hrsync server.
//!
//! # Overview
//!
//! A run authenticates once, splits the file into fixed-size batches and sends every
//! batch concurrently, retrying each one a bounded number of times:
//!
//! - **Source**: lazy, restartable CSV reading ([`source::RecordSource`])
//! - **Authentication**: one token exchange per run ([`auth::Authenticator`])
//! - **Batching**: order-preserving fixed-size chunks ([`batcher::partition`])
//! - **Upload**: per-batch retry loop ([`upload::UploadWorker`])
//! - **Dispatch**: concurrent fan-out/fan-in of batches ([`dispatcher::Dispatcher`])
//! - **Report**: end-of-run summary ([`report::RunSummary`])

pub mod api;
pub mod auth;
pub mod batcher;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod progress;
pub mod report;
pub mod source;
pub mod upload;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{CliError, Result};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// hrsync - bulk employee record uploader
#[derive(Parser, Debug)]
#[command(name = "hrsync")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Optional TOML configuration file
    #[arg(short, long, env = "HRSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload every valid record of a CSV file
    Upload {
        /// CSV file with a header row
        file: PathBuf,
    },

    /// Parse a CSV file and report invalid rows without contacting the server
    Validate {
        /// CSV file with a header row
        file: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration (password redacted)
    Show,
}

/// Settings that override the configuration file
///
/// Each flag also reads an `HRSYNC_*` environment variable, so the effective order is
/// flag, then environment, then file, then built-in default.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Server base URL used to derive the token and employees endpoints
    #[arg(long, env = "HRSYNC_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Token endpoint URL
    #[arg(long, env = "HRSYNC_TOKEN_URL", global = true)]
    pub token_url: Option<String>,

    /// Bulk employees endpoint URL
    #[arg(long, env = "HRSYNC_EMPLOYEES_URL", global = true)]
    pub employees_url: Option<String>,

    #[arg(long, env = "HRSYNC_USERNAME", global = true)]
    pub username: Option<String>,

    #[arg(long, env = "HRSYNC_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Records per request (keep at or below 5000; the server caps request bodies at 2 MB)
    #[arg(long, env = "HRSYNC_BATCH_SIZE", global = true)]
    pub batch_size: Option<usize>,

    /// Additional attempts after a failed request
    #[arg(long, env = "HRSYNC_MAX_RETRIES", global = true)]
    pub max_retries: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long, env = "HRSYNC_RETRY_DELAY_MS", global = true)]
    pub retry_delay_ms: Option<u64>,

    /// Retry delay strategy (constant or linear)
    #[arg(long, env = "HRSYNC_RETRY_STRATEGY", global = true)]
    pub retry_strategy: Option<upload::RetryStrategy>,

    /// Per-request timeout in seconds
    #[arg(long, env = "HRSYNC_REQUEST_TIMEOUT_SECS", global = true)]
    pub request_timeout_secs: Option<u64>,
}

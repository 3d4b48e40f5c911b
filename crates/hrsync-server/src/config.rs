//! Configuration management
//!
//! Loaded from the environment (`.env` honoured) with defaults, then validated.

use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::features::employees::writer::MAX_INSERT_CHUNK_SIZE;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://hrsync.db";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default rows per INSERT statement inside a batch transaction.
pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 500;

/// Default administrator account name.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Default bearer token lifetime (5 minutes).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 300;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    /// Rows per INSERT statement; atomicity still covers the whole batch
    pub insert_chunk_size: NonZeroUsize,
}

/// Token endpoint configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub token_ttl_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Parse an environment variable, falling back to `default` when unset or malformed
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("HRSYNC_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("HRSYNC_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "HRSYNC_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                ),
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
                insert_chunk_size: env_or(
                    "HRSYNC_INSERT_CHUNK_SIZE",
                    NonZeroUsize::new(DEFAULT_INSERT_CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN),
                ),
            },
            auth: AuthConfig {
                username: std::env::var("HRSYNC_ADMIN_USERNAME")
                    .unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string()),
                password: std::env::var("HRSYNC_ADMIN_PASSWORD").unwrap_or_default(),
                token_ttl_secs: env_or("HRSYNC_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if !self.database.url.starts_with("sqlite:") {
            anyhow::bail!(
                "Database URL must be a sqlite: URL, got '{}'",
                self.database.url
            );
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.insert_chunk_size.get() > MAX_INSERT_CHUNK_SIZE {
            anyhow::bail!(
                "HRSYNC_INSERT_CHUNK_SIZE must be at most {} (SQLite bound parameter limit), got {}",
                MAX_INSERT_CHUNK_SIZE,
                self.database.insert_chunk_size
            );
        }

        if self.auth.username.is_empty() {
            anyhow::bail!("HRSYNC_ADMIN_USERNAME cannot be empty");
        }

        if self.auth.password.is_empty() {
            anyhow::bail!("HRSYNC_ADMIN_PASSWORD must be set");
        }

        if self.auth.token_ttl_secs == 0 {
            anyhow::bail!("Token TTL must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                insert_chunk_size: NonZeroUsize::new(DEFAULT_INSERT_CHUNK_SIZE)
                    .unwrap_or(NonZeroUsize::MIN),
            },
            auth: AuthConfig {
                username: DEFAULT_ADMIN_USERNAME.to_string(),
                password: String::new(),
                token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn valid() -> Config {
        let mut config = Config::default();
        config.auth.password = "secret".to_string();
        config
    }

    #[test]
    fn test_default_needs_password() {
        assert!(Config::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_sqlite_url() {
        let mut config = valid();
        config.database.url = "postgresql://localhost/hr".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_port_and_ttl() {
        let mut config = valid();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.auth.token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_chunk_size_over_parameter_limit() {
        let mut config = valid();
        config.database.insert_chunk_size = NonZeroUsize::new(MAX_INSERT_CHUNK_SIZE).unwrap();
        assert!(config.validate().is_ok());

        config.database.insert_chunk_size = NonZeroUsize::new(MAX_INSERT_CHUNK_SIZE + 1).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("HRSYNC_INSERT_CHUNK_SIZE"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", valid().auth);
        assert!(!debug.contains("secret"));
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        std::env::set_var("HRSYNC_PORT", "9100");
        std::env::set_var("HRSYNC_ADMIN_PASSWORD", "pw");
        std::env::set_var("HRSYNC_INSERT_CHUNK_SIZE", "50");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test");

        let config = Config::load().unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.insert_chunk_size.get(), 50);
        assert_eq!(config.cors.allowed_origins, vec!["http://a.test", "http://b.test"]);

        std::env::remove_var("HRSYNC_PORT");
        std::env::remove_var("HRSYNC_ADMIN_PASSWORD");
        std::env::remove_var("HRSYNC_INSERT_CHUNK_SIZE");
        std::env::remove_var("CORS_ALLOWED_ORIGINS");
    }

    #[test]
    #[serial]
    fn test_zero_chunk_size_falls_back_to_default() {
        std::env::set_var("HRSYNC_ADMIN_PASSWORD", "pw");
        std::env::set_var("HRSYNC_INSERT_CHUNK_SIZE", "0");

        let config = Config::load().unwrap();
        assert_eq!(config.database.insert_chunk_size.get(), DEFAULT_INSERT_CHUNK_SIZE);

        std::env::remove_var("HRSYNC_ADMIN_PASSWORD");
        std::env::remove_var("HRSYNC_INSERT_CHUNK_SIZE");
    }
}

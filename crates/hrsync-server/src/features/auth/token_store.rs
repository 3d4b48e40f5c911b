//! In-memory bearer token store
//!
//! Tokens are random opaque strings with a fixed lifetime. They do not survive a
//! restart; clients authenticate once per run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TokenStore {
    inner: Arc<RwLock<HashMap<String, Instant>>>,
    ttl: Duration,
}

impl TokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh token valid for the configured lifetime
    ///
    /// Expired entries are purged on every issue so the map stays bounded by the
    /// number of live tokens.
    pub async fn issue(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();

        let mut tokens = self.inner.write().await;
        tokens.retain(|_, expires_at| *expires_at > now);
        tokens.insert(token.clone(), now + self.ttl);

        token
    }

    /// Whether `token` was issued here and has not expired
    pub async fn is_valid(&self, token: &str) -> bool {
        let tokens = self.inner.read().await;
        tokens
            .get(token)
            .is_some_and(|expires_at| *expires_at > Instant::now())
    }

    /// Number of tokens currently held, expired ones included
    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

//! Feature modules implementing the hrsync API
//!
//! # Features
//!
//! - **auth**: Token exchange and the bearer guard for protected routes
//! - **employees**: Bulk employee ingestion with duplicate skipping
//!
//! Each feature owns its routes; write operations live under `commands/`.

pub mod auth;
pub mod employees;
pub mod shared;

use std::num::NonZeroUsize;
use std::time::Duration;

use axum::{middleware::from_fn_with_state, Router};
use sqlx::SqlitePool;

use crate::config::{AuthConfig, Config};
use auth::TokenStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: TokenStore,
    pub auth: AuthConfig,
    /// Rows per INSERT statement in bulk writes
    pub insert_chunk_size: NonZeroUsize,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        Self {
            db,
            tokens: TokenStore::new(Duration::from_secs(config.auth.token_ttl_secs)),
            auth: config.auth.clone(),
            insert_chunk_size: config.database.insert_chunk_size,
        }
    }
}

/// Creates the API router with all feature routes mounted
///
/// - `/api/token/` is public
/// - `/api/employees/` requires a bearer token
pub fn router(state: AppState) -> Router<()> {
    let protected = employees::employees_routes()
        .route_layer(from_fn_with_state(state.clone(), auth::middleware::require_bearer));

    Router::new()
        .merge(auth::auth_routes())
        .merge(protected)
        .with_state(state)
}

//! HTTP server assembly
//!
//! Builds the router with its middleware stack and runs it until a shutdown signal.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::SqlitePool;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::config::{Config, CorsConfig};
use crate::db;
use crate::error::AppError;
use crate::features::{self, AppState};
use crate::middleware;

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state.db.clone())
        .merge(features::router(state))
        // Apply layers from innermost to outermost
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

/// Health check handler
async fn health_check(State(db): State<SqlitePool>) -> Result<Response, AppError> {
    match sqlx::query("SELECT 1").fetch_one(&db).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(AppError::Unavailable("Database unavailable".to_string()))
        },
    }
}

/// Open the database, bind the listener and serve until `shutdown` resolves
///
/// Once `shutdown` resolves the listener stops accepting connections and in-flight
/// requests get `server.shutdown_timeout_secs` to finish before they are dropped.
pub async fn serve<F>(config: Config, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let pool = db::create_pool(&config.database).await?;
    db::init_schema(&pool).await?;
    info!(url = %config.database.url, "Database ready");

    let state = AppState::new(pool.clone(), &config);
    let app = create_router(state, &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    let (signalled_tx, signalled_rx) = oneshot::channel();
    let signal = async move {
        shutdown.await;
        let _ = signalled_tx.send(());
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .into_future();
    tokio::pin!(server);

    let drain_deadline = async move {
        match signalled_rx.await {
            Ok(()) => tokio::time::sleep(grace).await,
            // Server finished without a signal
            Err(_) => std::future::pending().await,
        }
    };

    tokio::select! {
        result = &mut server => result?,
        _ = drain_deadline => {
            warn!(
                grace_secs = grace.as_secs(),
                "Shutdown grace period elapsed, dropping in-flight requests"
            );
        },
    }

    pool.close().await;
    info!("Server shut down gracefully");

    Ok(())
}

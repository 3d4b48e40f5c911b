//! Token authentication
//!
//! - `POST /api/token/` exchanges the configured administrator credentials for an
//!   opaque bearer token
//! - [`middleware::require_bearer`] guards protected routes

pub mod middleware;
pub mod routes;
pub mod token_store;

pub use routes::auth_routes;
pub use token_store::TokenStore;

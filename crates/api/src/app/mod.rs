//! HTTP API application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: ledger-core wiring (store, ledger, coordinator, queries)
//!   plus the user directory and admin login
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use corebank_auth::{Hs256Jwt, JwtValidator};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Process configuration, read from the environment by `main.rs` and passed
/// explicitly so tests can build the same app with their own values.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password: String,
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AppConfig) -> Router {
    let tokens = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes()));
    let jwt: Arc<dyn JwtValidator> = tokens.clone();
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::build_services(
        tokens,
        config.admin_username,
        config.admin_password,
    ));

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(Arc::clone(&services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .layer(Extension(services))
        .merge(protected)
        .layer(ServiceBuilder::new())
}

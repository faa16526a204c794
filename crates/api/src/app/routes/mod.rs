use axum::{routing::get, Router};

pub mod accounts;
pub mod auth;
pub mod statements;
pub mod system;
pub mod transactions;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/accounts", accounts::router())
        .nest("/transactions", transactions::router())
        .nest("/statements", statements::router())
        .nest("/users", users::router())
}

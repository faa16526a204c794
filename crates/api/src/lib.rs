//! `corebank-api` — HTTP surface of the ledger core.

pub mod app;
pub mod context;
pub mod middleware;

//! `corebank-auth` — session-token boundary for the ledger API.
//!
//! This crate is intentionally decoupled from HTTP and storage: claims
//! validation is pure, and the JWT codec only knows about bytes and clocks.

pub mod claims;
pub mod token;

pub use claims::{validate_claims, TokenClaims, TokenValidationError};
pub use token::{Hs256Jwt, JwtValidator, TokenError};

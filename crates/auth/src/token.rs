use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use corebank_core::UserId;

use crate::claims::{validate_claims, TokenClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed or tampered token")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token")]
    Signing,
}

/// Validates bearer tokens into [`TokenClaims`].
///
/// The API middleware only depends on this trait, so the signing scheme can
/// change without touching HTTP code.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;
}

/// Registered-claims wire shape (seconds since epoch, per RFC 7519).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// HS256 JWT codec: issues and validates tokens with one shared secret.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256Jwt {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `user_id`, valid for `ttl` starting at `now`.
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Result<String, TokenError> {
        let wire = WireClaims {
            sub: *user_id.as_uuid(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|_| TokenError::Signing)
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        // Expiry is checked against the explicit `now` below, not the
        // library's ambient clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let decoded = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        let claims = TokenClaims {
            sub: UserId::from_uuid(decoded.claims.sub),
            issued_at: DateTime::from_timestamp(decoded.claims.iat, 0).ok_or(TokenError::Invalid)?,
            expires_at: DateTime::from_timestamp(decoded.claims.exp, 0).ok_or(TokenError::Invalid)?,
        };
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

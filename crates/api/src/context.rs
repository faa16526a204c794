use chrono::{DateTime, Utc};

use corebank_core::UserId;

/// Authenticated session for one request.
///
/// Built by the auth middleware from validated token claims and passed
/// explicitly to handlers. Expiry was checked at extraction time against
/// the request clock; nothing here depends on ambient state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self { user_id, expires_at }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

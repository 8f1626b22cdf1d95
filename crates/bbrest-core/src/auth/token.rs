use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A token is treated as expired once less than this many seconds remain.
pub const EXPIRY_GRACE_SECS: i64 = 1;

/// Pause taken after deciding a token has expired, before asking for a new
/// one, so the server's clock has also moved past the old expiry.
pub const EXPIRY_SETTLE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    /// `None` for self-signed assertions, which are never tracked.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Token from a token-endpoint response: `expires_at = now + expires_in`.
    ///
    /// Returns `None` when `expires_in` does not fit in a timestamp.
    pub fn from_expires_in(access_token: impl Into<String>, expires_in: i64) -> Option<Self> {
        let expires_at = chrono::Duration::try_seconds(expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))?;
        Some(Self::new(access_token, Some(expires_at)))
    }

    pub fn as_str(&self) -> &str {
        &self.access_token
    }
}

/// True when less than `EXPIRY_GRACE_SECS` remains before `expires_at`.
pub fn expires_within_grace(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at - now < chrono::Duration::seconds(EXPIRY_GRACE_SECS)
}

/// Expiry check used before reusing a held token.
///
/// When the token has expired this waits `EXPIRY_SETTLE_DELAY` before
/// returning, so a refresh issued right after is not rejected for clock skew.
pub async fn is_expired(expires_at: DateTime<Utc>) -> bool {
    if expires_within_grace(expires_at, Utc::now()) {
        debug!(%expires_at, "Token expired, settling before refresh");
        tokio::time::sleep(EXPIRY_SETTLE_DELAY).await;
        true
    } else {
        false
    }
}

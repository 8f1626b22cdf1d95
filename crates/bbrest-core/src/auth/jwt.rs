//! HS256 assertions for the JWT-bearer grant (Collaborate) and the
//! self-signed bearer token (Ally).

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Lifetime of a bearer-grant assertion. Collaborate reads `exp` in
/// milliseconds, so this is added to a millisecond timestamp.
pub const BEARER_ASSERTION_LIFETIME_MS: i64 = 270_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerGrantClaims {
    pub iss: String,
    pub sub: String,
    pub exp: i64,
}

impl BearerGrantClaims {
    pub fn new(key: &str, now: DateTime<Utc>) -> Self {
        Self {
            iss: key.to_string(),
            sub: key.to_string(),
            exp: now.timestamp_millis() + BEARER_ASSERTION_LIFETIME_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfSignedClaims {
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub iat: i64,
}

impl SelfSignedClaims {
    pub fn new(client_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            client_id: client_id.to_string(),
            iat: now.timestamp(),
        }
    }
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, AuthError> {
    Ok(encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Assertion posted to the token endpoint with the jwt-bearer grant.
pub fn bearer_grant_assertion(
    key: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    sign(&BearerGrantClaims::new(key, now), secret)
}

/// Assertion used directly as the bearer token.
pub fn self_signed_assertion(
    client_id: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    sign(&SelfSignedClaims::new(client_id, now), secret)
}

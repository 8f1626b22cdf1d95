//! Token acquisition for the three Blackboard auth schemes.
//!
//! - Learn: OAuth2 client-credentials grant with HTTP Basic auth.
//! - Collaborate: OAuth2 JWT-bearer grant with a signed assertion.
//! - Ally: a locally signed assertion used directly as the bearer token.
//!
//! `TokenProvider` holds at most one token per credential set and hands out
//! the held token until it expires.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::jwt::{bearer_grant_assertion, self_signed_assertion};
use super::token::{is_expired, Token};
use super::AuthError;
use crate::api::ApiError;
use crate::config::Credentials;

// ============================================================================
// Constants
// ============================================================================

/// Learn OAuth2 token endpoint
pub const LEARN_TOKEN_ENDPOINT: &str = "/learn/api/public/v1/oauth2/token";

/// Collaborate token endpoint
pub const JWT_BEARER_TOKEN_ENDPOINT: &str = "/token";

const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// OAuth2 client credentials (Learn)
    #[default]
    ClientCredentials,
    /// OAuth2 JWT-bearer grant (Collaborate)
    JwtBearer,
    /// Self-signed JWT assertion (Ally)
    SelfSigned,
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthScheme::ClientCredentials => "learn",
            AuthScheme::JwtBearer => "collab",
            AuthScheme::SelfSigned => "ally",
        };
        f.write_str(name)
    }
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "learn" | "client-credentials" => Ok(AuthScheme::ClientCredentials),
            "collab" | "collaborate" | "jwt-bearer" => Ok(AuthScheme::JwtBearer),
            "ally" | "self-signed" => Ok(AuthScheme::SelfSigned),
            other => Err(format!(
                "unknown auth scheme '{}', expected learn, collab or ally",
                other
            )),
        }
    }
}

async fn request_token(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<Token, AuthError> {
    let response = request.send().await.map_err(|e| {
        error!(url = url, error = %e, "Failed to send authentication request");
        e
    })?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let description = ApiError::server_message(&body);
        error!(url = url, %status, description = %description, "Authentication failed");
        return Err(AuthError::Rejected {
            status,
            description,
        });
    }

    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| AuthError::InvalidResponse(format!("{}: {}", url, e)))?;
    if parsed.access_token.is_empty() {
        return Err(AuthError::InvalidResponse(format!(
            "{}: empty access_token",
            url
        )));
    }

    let token = Token::from_expires_in(parsed.access_token, parsed.expires_in).ok_or_else(|| {
        AuthError::InvalidResponse(format!(
            "{}: expires_in {} is out of range",
            url, parsed.expires_in
        ))
    })?;
    info!(expires_at = ?token.expires_at, "Authentication successful");
    Ok(token)
}

/// Exchange key/secret for a token with the client-credentials grant.
pub async fn authenticate_client_credentials(
    client: &Client,
    base_url: &str,
    key: &str,
    secret: &str,
) -> Result<Token, AuthError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), LEARN_TOKEN_ENDPOINT);
    let request = client
        .post(&url)
        .basic_auth(key, Some(secret))
        .form(&[("grant_type", CLIENT_CREDENTIALS_GRANT)]);
    request_token(request, &url).await
}

/// Exchange a signed assertion for a token with the JWT-bearer grant.
pub async fn authenticate_jwt_bearer(
    client: &Client,
    base_url: &str,
    key: &str,
    secret: &str,
) -> Result<Token, AuthError> {
    let url = format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        JWT_BEARER_TOKEN_ENDPOINT
    );
    let assertion = bearer_grant_assertion(key, secret, Utc::now())?;
    let request = client.post(&url).form(&[
        ("grant_type", JWT_BEARER_GRANT),
        ("assertion", assertion.as_str()),
    ]);
    request_token(request, &url).await
}

/// Sign an assertion locally. No network call and no expiry tracking.
pub fn authenticate_self_signed(client_id: &str, secret: &str) -> Result<Token, AuthError> {
    let assertion = self_signed_assertion(client_id, secret, Utc::now())?;
    debug!("Self-signed assertion created");
    Ok(Token::new(assertion, None))
}

/// Holds the current token for one credential set.
///
/// `get_token` takes `&mut self`; share a provider across tasks behind a
/// `tokio::sync::Mutex`.
pub struct TokenProvider {
    client: Client,
    credentials: Credentials,
    scheme: AuthScheme,
    token: Option<Token>,
}

impl TokenProvider {
    pub fn new(client: Client, credentials: Credentials, scheme: AuthScheme) -> Self {
        Self {
            client,
            credentials,
            scheme,
            token: None,
        }
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The held token, if any, without checking expiry.
    pub fn current(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    async fn authenticate(&self) -> Result<Token, AuthError> {
        let creds = &self.credentials;
        match self.scheme {
            AuthScheme::ClientCredentials => {
                authenticate_client_credentials(
                    &self.client,
                    &creds.base_url,
                    &creds.key,
                    &creds.secret,
                )
                .await
            }
            AuthScheme::JwtBearer => {
                authenticate_jwt_bearer(&self.client, &creds.base_url, &creds.key, &creds.secret)
                    .await
            }
            AuthScheme::SelfSigned => {
                let client_id = creds
                    .client_id
                    .as_deref()
                    .ok_or(AuthError::MissingClientId)?;
                authenticate_self_signed(client_id, &creds.secret)
            }
        }
    }

    /// Return a usable token: authenticate on first use, refresh once the
    /// held token has expired, otherwise hand back the held token.
    pub async fn get_token(&mut self) -> Result<Token, AuthError> {
        let needs_refresh = match self.token.as_ref().map(|t| t.expires_at) {
            None => true,
            // Untracked assertions are re-derived on every call
            Some(None) => true,
            Some(Some(expires_at)) => is_expired(expires_at).await,
        };

        let token = match self.token.take() {
            Some(token) if !needs_refresh => token,
            previous => {
                if previous.is_some() {
                    info!(scheme = %self.scheme, "Refreshing token");
                }
                self.authenticate().await?
            }
        };

        self.token = Some(token.clone());
        Ok(token)
    }
}

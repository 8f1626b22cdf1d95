use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The token endpoint answered with a non-2xx status. Not retried.
    #[error("Authentication rejected ({status}): {description}")]
    Rejected {
        status: StatusCode,
        description: String,
    },

    #[error("Network error during authentication: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    #[error("Failed to sign JWT assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Self-signed authentication requires a client_id in the credentials")]
    MissingClientId,
}

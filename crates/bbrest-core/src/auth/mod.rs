//! Authentication module for obtaining and holding bearer tokens.
//!
//! This module provides:
//! - `TokenProvider`: per-credential token cache with expiry-driven refresh
//! - `Token`: an access token and its expiry
//! - JWT assertion builders for the bearer-grant and self-signed schemes

pub mod error;
pub mod jwt;
pub mod provider;
pub mod token;

pub use error::AuthError;
pub use provider::{
    authenticate_client_credentials, authenticate_jwt_bearer, authenticate_self_signed,
    AuthScheme, TokenProvider,
};
pub use token::{is_expired, Token, EXPIRY_SETTLE_DELAY};

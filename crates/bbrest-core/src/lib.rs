//! Convenience wrapper around the Blackboard REST APIs (Learn, Collaborate
//! and Ally).
//!
//! - `config`: credential file loading
//! - `auth`: bearer tokens for the three auth schemes
//! - `api`: authenticated GET/POST/PUT/PATCH/DELETE with pagination
//! - `session`: credentials, token provider and executor in one place
//! - `utils`: dates, CSV, pretty printing, course lookups
//! - `logging`: process-wide tracing setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthScheme, Token, TokenProvider};
pub use config::{ConfigError, Credentials};
pub use error::{Error, Result};
pub use session::{RequestOptions, Session};

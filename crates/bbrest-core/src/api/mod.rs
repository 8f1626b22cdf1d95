//! REST request executor for the Blackboard API family.
//!
//! This module provides the `ApiClient` for issuing authenticated GET, POST,
//! PUT, PATCH and DELETE calls against Learn, Collaborate and Ally, plus
//! file uploads to Learn's temporary storage.
//!
//! Failures are returned as `ApiError`, carrying the server-provided
//! message when the error body could be decoded.

pub mod client;
pub mod error;
pub mod rate_limit;

pub use client::{build_http_client, ApiClient, Params, DEFAULT_TIMEOUT_SECS, UPLOADS_ENDPOINT};
pub use error::ApiError;
pub use rate_limit::RateLimit;

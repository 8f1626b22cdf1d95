//! Credential file loading.
//!
//! Credentials live in a small JSON file kept out of source control:
//!
//! ```json
//! { "url": "https://learn.example.edu", "key": "...", "secret": "...", "client_id": "..." }
//! ```
//!
//! `client_id` is only needed for the self-signed (Ally) scheme.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

/// Default credential file looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// API credentials for one platform. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "url")]
    pub base_url: String,
    pub key: String,
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl Credentials {
    pub fn new(
        base_url: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            key: key.into(),
            secret: secret.into(),
            client_id: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Load credentials from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            error!(path = %path.display(), "No configuration file found");
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let credentials: Credentials =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), "Configuration file loaded");
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_credentials() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"url": "https://learn.example.edu", "key": "k", "secret": "s"}}"#
        )
        .unwrap();

        let creds = Credentials::load(file.path()).unwrap();
        assert_eq!(creds.base_url, "https://learn.example.edu");
        assert_eq!(creds.key, "k");
        assert_eq!(creds.secret, "s");
        assert_eq!(creds.client_id, None);
    }

    #[test]
    fn test_load_credentials_with_client_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"url": "https://ally.example.com", "key": "k", "secret": "s", "client_id": "42"}}"#
        )
        .unwrap();

        let creds = Credentials::load(file.path()).unwrap();
        assert_eq!(creds.client_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"url": "https://x"}}"#).unwrap();

        let err = Credentials::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

use std::time::Duration;

use reqwest::Client;
use tracing::warn;

/// Host probed by `check_connection` when none is given
pub const DEFAULT_CONNECTION_HOST: &str = "https://www.google.com/";

/// Default probe timeout in seconds
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 5;

/// True when an HTTP GET to `host` gets any response within `timeout`.
pub async fn check_connection(host: &str, timeout: Duration) -> bool {
    let client = match Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Failed to build HTTP client");
            return false;
        }
    };

    match client.get(host).send().await {
        Ok(_) => true,
        Err(e) => {
            warn!(host = host, error = %e, "No connection");
            false
        }
    }
}

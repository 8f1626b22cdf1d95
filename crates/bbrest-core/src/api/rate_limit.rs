use reqwest::header::HeaderMap;
use tracing::{debug, info};

const LIMIT_HEADER: &str = "x-rate-limit-limit";
const REMAINING_HEADER: &str = "x-rate-limit-remaining";
const RESET_HEADER: &str = "x-rate-limit-reset";

/// Rate limit counters reported by Learn. Collaborate omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: Option<String>,
    pub remaining: Option<String>,
    pub reset: Option<String>,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            limit: get(LIMIT_HEADER),
            remaining: get(REMAINING_HEADER),
            reset: get(RESET_HEADER),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset.is_none()
    }

    pub fn log(&self) {
        if self.is_empty() {
            debug!("No rate limit headers in response");
            return;
        }
        info!(
            limit = self.limit.as_deref().unwrap_or("-"),
            remaining = self.remaining.as_deref().unwrap_or("-"),
            reset = self.reset.as_deref().unwrap_or("-"),
            "API rate limit"
        );
    }
}

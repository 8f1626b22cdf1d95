//! Request executor for the Blackboard REST APIs.
//!
//! `ApiClient` issues one logical API operation per call. Every call carries
//! `Authorization: Bearer <token>`; GET additionally walks `paging.nextPage`
//! until the server stops returning one.

use std::path::Path;
use std::time::Duration;

use reqwest::{header, multipart, Body, Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, warn};

use super::{ApiError, RateLimit};

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Temporary file storage endpoint on Learn.
pub const UPLOADS_ENDPOINT: &str = "/learn/api/public/v1/uploads";

/// Query parameters for a single call.
pub type Params<'a> = &'a [(&'a str, &'a str)];

#[derive(Debug, Default, Deserialize)]
struct Paging {
    #[serde(rename = "nextPage", default)]
    next_page: Option<String>,
}

/// One page of a collection response. Both fields are optional because
/// some endpoints answer with a bare object.
#[derive(Debug, Default, Deserialize)]
struct Page {
    #[serde(default)]
    results: Option<Vec<Value>>,
    #[serde(default)]
    paging: Option<Paging>,
}

impl Page {
    fn next_page(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next_page.as_deref())
            .filter(|next| !next.is_empty())
    }
}

/// Build the HTTP client shared by the token provider and the executor.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// API client bound to one base URL.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client with its own connection pool
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self::with_client(build_http_client(timeout)?, base_url))
    }

    /// Create an API client on top of an existing connection pool.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Read the body as JSON, then check the status so that error bodies
    /// still yield the server message.
    async fn read_json(response: Response, method: &Method, url: &str) -> Result<Value, ApiError> {
        let status = response.status();
        let rate_limit = RateLimit::from_headers(response.headers());
        let text = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &text);
            error!(%method, url = url, %status, error = %err, "Request failed");
            return Err(err);
        }

        rate_limit.log();
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("{} {} returned invalid JSON: {}", method, url, e))
        })
    }

    /// GET a collection, following `paging.nextPage` until exhausted.
    ///
    /// Only the first request carries `params`; follow-up pages use the
    /// server-supplied path verbatim. A page without `results` contributes
    /// nothing, so callers must tolerate an empty vector.
    pub async fn get(
        &self,
        endpoint: &str,
        token: &str,
        params: Params<'_>,
    ) -> Result<Vec<Value>, ApiError> {
        let mut url = self.url(endpoint);
        let mut request = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .query(params);
        let mut results = Vec::new();
        let mut pages = 0usize;

        loop {
            let response = request.send().await.map_err(|e| {
                error!(url = %url, error = %e, "Failed to send GET request");
                e
            })?;
            let body = Self::read_json(response, &Method::GET, &url).await?;
            pages += 1;

            let mut page = match serde_json::from_value::<Page>(body) {
                Ok(page) => page,
                Err(e) => {
                    warn!(url = %url, error = %e, "Unexpected response shape, treating as no data");
                    Page::default()
                }
            };

            match page.results.take() {
                Some(items) => results.extend(items),
                None => warn!(url = %url, "Response has no results"),
            }

            let Some(next) = page.next_page() else {
                break;
            };
            let next_url = self.url(next);
            if next_url == url {
                warn!(url = %url, "Server returned the same page as next, stopping");
                break;
            }
            url = next_url;
            debug!(url = %url, page = pages + 1, "Following next page");
            request = self.client.get(&url).bearer_auth(token);
        }

        info!(count = results.len(), pages, "GET request completed");
        Ok(results)
    }

    async fn send_with_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        token: &str,
        payload: &B,
        params: Params<'_>,
    ) -> Result<Value, ApiError> {
        let url = self.url(endpoint);
        let response = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(token)
            .query(params)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(%method, url = %url, error = %e, "Failed to send request");
                e
            })?;

        let data = Self::read_json(response, &method, &url).await?;
        info!(%method, "Request completed");
        Ok(data)
    }

    /// POST a JSON payload and return the created record.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        token: &str,
        payload: &B,
        params: Params<'_>,
    ) -> Result<Value, ApiError> {
        self.send_with_body(Method::POST, endpoint, token, payload, params)
            .await
    }

    /// PUT replaces a record entirely.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        token: &str,
        payload: &B,
        params: Params<'_>,
    ) -> Result<Value, ApiError> {
        self.send_with_body(Method::PUT, endpoint, token, payload, params)
            .await
    }

    /// PATCH updates a record partially.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        token: &str,
        payload: &B,
        params: Params<'_>,
    ) -> Result<Value, ApiError> {
        self.send_with_body(Method::PATCH, endpoint, token, payload, params)
            .await
    }

    /// DELETE a record. Success is normally 204 with no body.
    pub async fn delete(
        &self,
        endpoint: &str,
        token: &str,
        params: Params<'_>,
    ) -> Result<(), ApiError> {
        let url = self.url(endpoint);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            error!(url = %url, %status, error = %err, "The resource could not be deleted");
            return Err(err);
        }
        if status != StatusCode::NO_CONTENT {
            debug!(%status, "DELETE answered with a body");
        }

        RateLimit::from_headers(response.headers()).log();
        info!("DELETE request completed");
        Ok(())
    }

    /// Upload a file to temporary storage and return its upload id, used
    /// by later calls such as content creation. The file is streamed from
    /// disk rather than read into memory.
    pub async fn upload_file(&self, token: &str, path: &Path) -> Result<String, ApiError> {
        let url = self.url(UPLOADS_ENDPOINT);
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let body = Body::wrap_stream(ReaderStream::new(file));
        let form = multipart::Form::new().part(
            "file",
            multipart::Part::stream_with_length(body, length).file_name(file_name),
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let data = Self::read_json(response, &Method::POST, &url).await?;

        let id = data
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidResponse("Upload response has no id".to_string()))?;
        info!(path = %path.display(), "File uploaded to temporary storage");
        Ok(id)
    }
}

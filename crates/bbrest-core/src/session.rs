//! One credential set, one base URL: the token provider and the request
//! executor wired together.
//!
//! Every call asks the provider for the current token first, so requests
//! never carry a token the provider has already decided is expired.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::api::{build_http_client, ApiClient, ApiError, Params, DEFAULT_TIMEOUT_SECS};
use crate::auth::{AuthScheme, Token, TokenProvider};
use crate::config::Credentials;
use crate::error::Result;
use crate::utils;

#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Applied to every HTTP call, including token requests.
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct Session {
    provider: TokenProvider,
    api: ApiClient,
}

impl Session {
    pub fn new(
        credentials: Credentials,
        scheme: AuthScheme,
        options: &RequestOptions,
    ) -> Result<Self> {
        let client = build_http_client(options.timeout).map_err(ApiError::from)?;
        let api = ApiClient::with_client(client.clone(), credentials.base_url.clone());
        let provider = TokenProvider::new(client, credentials, scheme);
        Ok(Self { provider, api })
    }

    /// Load credentials from `path`, authenticate, and return a ready session.
    pub async fn quick_auth(
        path: impl AsRef<Path>,
        scheme: AuthScheme,
        options: &RequestOptions,
    ) -> Result<Self> {
        let credentials = Credentials::load(path)?;
        let mut session = Self::new(credentials, scheme, options)?;
        session.token().await?;
        info!(scheme = %scheme, url = session.base_url(), "Session ready");
        Ok(session)
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn scheme(&self) -> AuthScheme {
        self.provider.scheme()
    }

    /// Current token, authenticating or refreshing as needed.
    pub async fn token(&mut self) -> Result<Token> {
        Ok(self.provider.get_token().await?)
    }

    pub async fn get(&mut self, endpoint: &str, params: Params<'_>) -> Result<Vec<Value>> {
        let token = self.token().await?;
        Ok(self.api.get(endpoint, token.as_str(), params).await?)
    }

    pub async fn post<B: Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        payload: &B,
        params: Params<'_>,
    ) -> Result<Value> {
        let token = self.token().await?;
        Ok(self.api.post(endpoint, token.as_str(), payload, params).await?)
    }

    pub async fn put<B: Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        payload: &B,
        params: Params<'_>,
    ) -> Result<Value> {
        let token = self.token().await?;
        Ok(self.api.put(endpoint, token.as_str(), payload, params).await?)
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        payload: &B,
        params: Params<'_>,
    ) -> Result<Value> {
        let token = self.token().await?;
        Ok(self.api.patch(endpoint, token.as_str(), payload, params).await?)
    }

    pub async fn delete(&mut self, endpoint: &str, params: Params<'_>) -> Result<()> {
        let token = self.token().await?;
        Ok(self.api.delete(endpoint, token.as_str(), params).await?)
    }

    pub async fn upload_file(&mut self, path: &Path) -> Result<String> {
        let token = self.token().await?;
        Ok(self.api.upload_file(token.as_str(), path).await?)
    }

    pub async fn check_course_id(&mut self, external_course_id: &str) -> Result<bool> {
        let token = self.token().await?;
        Ok(utils::check_course_id(&self.api, token.as_str(), external_course_id).await?)
    }

    pub async fn convert_external_id(
        &mut self,
        external_id: &str,
        final_id: &str,
    ) -> Result<Option<String>> {
        let token = self.token().await?;
        Ok(utils::convert_external_id(&self.api, token.as_str(), external_id, final_id).await?)
    }
}

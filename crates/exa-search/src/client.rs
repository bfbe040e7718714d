//! Async HTTP client for the Exa `/search` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{SearchError, SearchResult};
use crate::types::SearchOptions;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

const USER_AGENT: &str = concat!("exa-search-rs/", env!("CARGO_PKG_VERSION"));

/// Anything that can answer a search query.
///
/// The result is the provider's raw payload; callers forward it without
/// reinterpreting it.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, options: &SearchOptions) -> SearchResult<Value>;
}

/// Client bound to a single API key.
#[derive(Clone)]
pub struct ExaClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ExaClient {
    /// Create a client against the production API.
    ///
    /// The key is not checked here; a malformed key is rejected by the
    /// provider on the first request.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(api_key, DEFAULT_BASE_URL, None)
    }

    /// Create a client with an explicit API root and optional request timeout.
    pub fn with_config(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            client: builder.build().unwrap_or_default(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body(query: &str, options: &SearchOptions) -> SearchResult<Value> {
        let mut body =
            serde_json::to_value(options).map_err(|e| SearchError::Decode(e.to_string()))?;
        if let Value::Object(map) = &mut body {
            map.insert("query".to_string(), Value::String(query.to_string()));
        }
        Ok(body)
    }
}

impl std::fmt::Debug for ExaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExaClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchProvider for ExaClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> SearchResult<Value> {
        let url = format!("{}/search", self.base_url);
        let body = Self::request_body(query, options)?;

        tracing::debug!("POST {url}");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(text);
            tracing::warn!("Search request rejected with status {}", status.as_u16());
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| SearchError::Decode(e.to_string()))
    }
}

//! Capability session: gates tool use behind a one-time `auth` step.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use exa_search::{ExaClient, SearchProvider};

use crate::types::{ToolError, ToolResult};

/// Builds an upstream client from a credential.
pub trait ProviderFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> Arc<dyn SearchProvider>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&str) -> Arc<dyn SearchProvider> + Send + Sync,
{
    fn connect(&self, api_key: &str) -> Arc<dyn SearchProvider> {
        self(api_key)
    }
}

/// Connects [`ExaClient`]s against a configured API root.
#[derive(Debug, Clone)]
pub struct ExaConnector {
    base_url: String,
    timeout: Option<Duration>,
}

impl ExaConnector {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl Default for ExaConnector {
    fn default() -> Self {
        Self::new(exa_search::DEFAULT_BASE_URL, None)
    }
}

impl ProviderFactory for ExaConnector {
    fn connect(&self, api_key: &str) -> Arc<dyn SearchProvider> {
        Arc::new(ExaClient::with_config(api_key, &self.base_url, self.timeout))
    }
}

/// Per-process authentication state.
///
/// Starts unauthenticated. [`authenticate`](Self::authenticate) binds a client
/// and may be called again to replace it; there is no way back to the
/// unauthenticated state. Callers get a cloned handle, so a call already in
/// flight keeps using the client it started with.
pub struct CapabilitySession {
    factory: Arc<dyn ProviderFactory>,
    client: RwLock<Option<Arc<dyn SearchProvider>>>,
}

impl CapabilitySession {
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            factory,
            client: RwLock::new(None),
        }
    }

    /// Session that talks to the Exa API at `base_url`.
    pub fn with_exa(base_url: &str, timeout: Option<Duration>) -> Self {
        Self::new(Arc::new(ExaConnector::new(base_url, timeout)))
    }

    /// Bind an upstream client to `api_key`.
    ///
    /// The key is accepted as-is; a malformed key surfaces as an upstream
    /// error on the first search.
    pub async fn authenticate(&self, api_key: &str) {
        let client = self.factory.connect(api_key);
        let previous = self.client.write().await.replace(client);

        if previous.is_some() {
            tracing::info!("Re-authenticated; upstream client replaced");
        } else {
            tracing::info!("Authenticated; upstream client bound");
        }
    }

    /// The bound client, or `NotAuthenticated`.
    pub async fn upstream_client(&self) -> ToolResult<Arc<dyn SearchProvider>> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(ToolError::NotAuthenticated)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.client.read().await.is_some()
    }
}

impl Default for CapabilitySession {
    fn default() -> Self {
        Self::new(Arc::new(ExaConnector::default()))
    }
}

//! Remote media access over HTTP.

use std::future::Future;
use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::error::{MediaError, Result};

/// Probe-and-download access to remote media references.
pub trait MediaFetcher: Send + Sync {
    /// Liveness check; `false` means the reference should render as
    /// unavailable.
    fn probe(&self, url: &str) -> impl Future<Output = bool> + Send;

    /// Download the reference to `dest`.
    fn download(&self, url: &str, dest: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// `reqwest`-backed fetcher used by the production client.
#[derive(Debug, Clone)]
pub struct HttpMediaFetcher {
    client: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaFetcher for HttpMediaFetcher {
    async fn probe(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, url = %url, "Media probe failed");
                false
            }
        }
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| MediaError::Fetch(e.to_string()))?;

        let data = response
            .bytes()
            .await
            .map_err(|e| MediaError::Fetch(e.to_string()))?;

        tokio::fs::write(dest, &data).await?;
        debug!(url = %url, path = %dest.display(), size = data.len(), "Downloaded media");
        Ok(())
    }
}

impl crate::attach::ResourceLoader for HttpMediaFetcher {
    async fn load(&self, uri: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| MediaError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| MediaError::Fetch(e.to_string()))?;

        response
            .bytes()
            .await
            .map_err(|e| MediaError::Fetch(e.to_string()))
    }
}

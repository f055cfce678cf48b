//! Raw asset fetching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{GenAiError, GenAiResult};

/// Check that a locator is a well-formed remote (http/https) URL.
pub fn is_remote_locator(locator: &str) -> bool {
    match Url::parse(locator) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Turns a result locator into in-memory bytes.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, locator: &str) -> GenAiResult<Vec<u8>>;
}

/// HTTP asset fetcher.
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given per-request timeout.
    pub fn new(timeout: Duration) -> GenAiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GenAiError::Network)?;
        Ok(Self { http })
    }

    /// Create with the default timeout (120 s; generated clips can be large).
    pub fn with_defaults() -> GenAiResult<Self> {
        Self::new(Duration::from_secs(120))
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> GenAiResult<Vec<u8>> {
        if !is_remote_locator(locator) {
            return Err(GenAiError::InvalidLocator(locator.to_string()));
        }

        debug!("Fetching asset from {}", locator);

        let response = self
            .http
            .get(locator)
            .send()
            .await
            .map_err(GenAiError::Network)?;

        if !response.status().is_success() {
            return Err(GenAiError::request_failed(format!(
                "asset fetch returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(GenAiError::Network)?;
        Ok(bytes.to_vec())
    }
}

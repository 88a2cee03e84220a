//! The HTTP seam.
//!
//! Extraction only needs "give me the body of this page". [`PageFetcher`]
//! is that contract; [`HttpFetcher`] fulfils it with reqwest, and tests
//! substitute an in-memory implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::PortalConfig;
use crate::error::PortalError;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the response body of a successful (2xx) request.
    async fn fetch(&self, url: &Url) -> Result<String, PortalError>;
}

/// reqwest-backed fetcher. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &PortalConfig) -> Result<Self, PortalError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PortalError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, PortalError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PortalError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PortalError::Transport(e.to_string()))?;
        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "portal_page_fetched");
        Ok(body)
    }
}

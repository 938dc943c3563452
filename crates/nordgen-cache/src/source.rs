//! Where raw server listings come from.

use async_trait::async_trait;
use nordgen_client::{NordClient, RetryConfig};
use nordgen_core::RawServer;

use crate::config::CacheConfig;

/// A provider of raw server listings.
#[async_trait]
pub trait ServerSource: Send + Sync + 'static {
    /// Fetch and decode the full listing.
    async fn fetch(&self) -> nordgen_core::Result<Vec<RawServer>>;
}

/// The upstream HTTP directory.
#[derive(Debug, Clone)]
pub struct UpstreamSource {
    client: NordClient,
    technology: String,
    limit: u32,
}

impl UpstreamSource {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: NordClient, technology: impl Into<String>, limit: u32) -> Self {
        Self {
            client,
            technology: technology.into(),
            limit,
        }
    }

    /// Build a client from cache configuration.
    pub fn from_config(config: &CacheConfig) -> crate::Result<Self> {
        let client = NordClient::builder()
            .base_url(&config.upstream_url)
            .timeout(config.request_timeout())
            .retry(RetryConfig::default())
            .build()?;
        Ok(Self::new(client, &config.technology, config.limit))
    }
}

#[async_trait]
impl ServerSource for UpstreamSource {
    async fn fetch(&self) -> nordgen_core::Result<Vec<RawServer>> {
        self.client
            .servers()
            .list()
            .limit(self.limit)
            .technology(&self.technology)
            .send()
            .await
    }
}

//! Server listing endpoints.

use crate::NordClient;
use nordgen_core::{RawServer, Result};
use tracing::debug;

/// Default server-side result limit
pub const DEFAULT_LIMIT: u32 = 16384;

/// Default technology filter
pub const DEFAULT_TECHNOLOGY: &str = "wireguard_udp";

const SERVERS_PATH: &str = "/v1/servers";
const TECHNOLOGY_FILTER: &str = "filters[servers_technologies][identifier]";

/// Server listing endpoints
#[derive(Debug)]
pub struct ServersApi<'a> {
    client: &'a NordClient,
}

impl<'a> ServersApi<'a> {
    pub(crate) const fn new(client: &'a NordClient) -> Self {
        Self { client }
    }

    /// List servers, filtered to WireGuard-capable ones by default
    #[must_use]
    pub fn list(&self) -> ServerListBuilder<'a> {
        ServerListBuilder::new(self.client)
    }
}

/// Builder for listing servers
#[derive(Debug)]
pub struct ServerListBuilder<'a> {
    client: &'a NordClient,
    limit: u32,
    technology: String,
}

impl<'a> ServerListBuilder<'a> {
    fn new(client: &'a NordClient) -> Self {
        Self {
            client,
            limit: DEFAULT_LIMIT,
            technology: DEFAULT_TECHNOLOGY.to_string(),
        }
    }

    /// Set the maximum number of servers returned
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Filter by technology identifier
    #[must_use]
    pub fn technology(mut self, identifier: impl Into<String>) -> Self {
        self.technology = identifier.into();
        self
    }

    /// Execute the request
    pub async fn send(self) -> Result<Vec<RawServer>> {
        let limit_str = self.limit.to_string();
        let params = [
            ("limit", limit_str.as_str()),
            (TECHNOLOGY_FILTER, self.technology.as_str()),
        ];

        let servers: Vec<RawServer> = self.client.get_with_query(SERVERS_PATH, &params).await?;
        debug!(count = servers.len(), "decoded server listing");
        Ok(servers)
    }
}

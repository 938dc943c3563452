//! Main server directory client implementation.

use crate::api::ServersApi;
use crate::config::RetryConfig;
use nordgen_core::{NordError, Result};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// The NordVPN API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.nordvpn.com";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of body bytes echoed into an error message
const ERROR_BODY_LIMIT: usize = 256;

/// Client for the upstream server directory
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct NordClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: HttpClient,
    base_url: Url,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl NordClient {
    /// Create a client against the public API using default settings
    pub fn new() -> Result<Self> {
        NordClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> NordClientBuilder {
        NordClientBuilder::new()
    }

    /// Access the server listing endpoints
    #[must_use]
    pub fn servers(&self) -> ServersApi<'_> {
        ServersApi::new(self)
    }

    /// The configured base URL
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Perform a GET request with query parameters, retrying transient failures
    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.build_url(path, params)?;
        let retry = &self.inner.retry_config;
        let mut attempt = 0;

        loop {
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < retry.max_retries && self.should_retry(&e) => {
                    let backoff = retry.backoff_for(attempt);
                    warn!(
                        url = %url,
                        attempt = attempt + 1,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.handle_response(response).await
    }

    fn should_retry(&self, error: &NordError) -> bool {
        match error {
            NordError::RateLimited { .. } => self.inner.retry_config.retry_on_rate_limit,
            e => e.is_retryable(),
        }
    }

    /// Build a URL from the base, a path and query parameters
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| NordError::InvalidUrl(format!("{path}: {e}")))?;

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    /// Map a transport failure to an error variant
    fn transport_error(&self, error: &reqwest::Error) -> NordError {
        if error.is_timeout() {
            NordError::Timeout(self.inner.timeout.as_secs())
        } else if error.is_connect() {
            NordError::Connection(error.to_string())
        } else {
            NordError::Http(error.to_string())
        }
    }

    /// Handle an API response that returns JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await.map_err(|e| self.transport_error(&e))?;
            serde_json::from_slice(&body).map_err(NordError::Json)
        } else {
            Self::handle_error(status.as_u16(), response).await
        }
    }

    /// Convert an error response to a `NordError`
    async fn handle_error<T>(status: u16, response: reqwest::Response) -> Result<T> {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());

        let mut message = response.text().await.unwrap_or_default();
        if message.len() > ERROR_BODY_LIMIT {
            let cut = (0..=ERROR_BODY_LIMIT)
                .rev()
                .find(|i| message.is_char_boundary(*i))
                .unwrap_or(0);
            message.truncate(cut);
        }

        match status {
            404 => Err(NordError::NotFound { resource: message }),
            429 => {
                warn!("rate limited by upstream directory");
                Err(NordError::RateLimited { retry_after })
            }
            _ => Err(NordError::Api {
                code: status,
                message,
            }),
        }
    }
}

/// Builder for configuring a [`NordClient`]
#[derive(Debug)]
pub struct NordClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
    retry_config: RetryConfig,
}

impl Default for NordClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NordClientBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("nordgen/{}", env!("CARGO_PKG_VERSION")),
            retry_config: RetryConfig::default(),
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set retry configuration
    #[must_use]
    pub const fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<NordClient> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| NordError::InvalidUrl(format!("{}: {e}", self.base_url)))?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| NordError::Http(e.to_string()))?;

        Ok(NordClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                retry_config: self.retry_config,
            }),
        })
    }
}

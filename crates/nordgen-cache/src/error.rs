//! Error types for the server directory cache.

use nordgen_core::NordError;
use thiserror::Error;

/// Errors that can occur in cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No snapshot has been published yet; callers should retry shortly.
    #[error("cache not yet initialized")]
    NotInitialized,

    /// Fetching or decoding the upstream listing failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] NordError),

    /// Configuration is invalid or unreadable.
    #[error("config error: {0}")]
    Config(String),

    /// Static asset loading failed.
    #[error("asset error: {0}")]
    Asset(String),

    /// A background build task failed to complete.
    #[error("build task failed: {0}")]
    Task(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CacheError {
    /// Returns true for the "try again shortly" sentinel.
    #[must_use]
    pub const fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized)
    }
}

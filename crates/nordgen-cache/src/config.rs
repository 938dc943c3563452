//! Cache configuration.

use nordgen_core::MinVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a server directory cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Upstream API base URL.
    pub upstream_url: String,

    /// Technology identifier the upstream listing is filtered on.
    pub technology: String,

    /// Server-side limit on the number of listed servers.
    pub limit: u32,

    /// Upstream request timeout (seconds).
    pub request_timeout_secs: u64,

    /// How often to refresh the snapshot (seconds).
    pub refresh_interval_secs: u64,

    /// Directory holding the static assets.
    pub public_dir: PathBuf,

    /// Web path of the template the listing is embedded into.
    pub index_path: String,

    /// Minimum advertised server version, as `MAJOR.MINOR`.
    pub min_version: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            upstream_url: nordgen_client::DEFAULT_BASE_URL.to_string(),
            technology: nordgen_client::api::DEFAULT_TECHNOLOGY.to_string(),
            limit: nordgen_client::api::DEFAULT_LIMIT,
            request_timeout_secs: 10,
            refresh_interval_secs: 300,
            public_dir: PathBuf::from("./public"),
            index_path: String::from("/index.html"),
            min_version: String::from("2.1"),
        }
    }
}

impl CacheConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let config: Self = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| crate::CacheError::Config(format!("{}: {e}", path.display())))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot check.
    pub fn validate(&self) -> crate::Result<()> {
        if self.refresh_interval_secs == 0 {
            return Err(crate::CacheError::Config(
                "refresh_interval_secs must be positive".into(),
            ));
        }
        if !self.index_path.starts_with('/') {
            return Err(crate::CacheError::Config(format!(
                "index_path '{}' must start with '/'",
                self.index_path
            )));
        }
        self.min_version()?;
        Ok(())
    }

    /// Parsed eligibility floor.
    pub fn min_version(&self) -> crate::Result<MinVersion> {
        self.min_version
            .parse()
            .map_err(|e: nordgen_core::ParseVersionError| crate::CacheError::Config(e.to_string()))
    }

    /// Refresh period.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Upstream request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

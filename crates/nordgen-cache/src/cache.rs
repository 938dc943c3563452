//! The published-snapshot cache and its refresh loop.
//!
//! Readers load the current `Arc<Snapshot>` from an [`ArcSwapOption`] and
//! work against it without locks; a refresh builds a complete replacement
//! off to the side and publishes it with a single store. Readers that
//! loaded the old snapshot keep a valid view until they drop it.

use arc_swap::{ArcSwap, ArcSwapOption};
use nordgen_core::{normalize, KeyId, Server};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::assets::{Asset, AssetStore};
use crate::config::CacheConfig;
use crate::snapshot::{Listing, Snapshot, SnapshotBuilder};
use crate::source::{ServerSource, UpstreamSource};
use crate::{CacheError, Result};

/// What a call to [`ServerCache::refresh`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot is now being served.
    Published {
        /// Validation token of the new snapshot.
        etag: String,
        /// Number of servers in it.
        servers: usize,
    },
    /// Another refresh was already running; nothing was done.
    InFlight,
}

/// Shared handle to the server directory cache. Clones share state.
#[derive(Clone)]
pub struct ServerCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    config: CacheConfig,
    builder: SnapshotBuilder,
    source: Box<dyn ServerSource>,
    current: ArcSwapOption<Snapshot>,
    assets: ArcSwap<AssetStore>,
    refreshing: Mutex<()>,
}

impl std::fmt::Debug for ServerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerCache")
            .field("config", &self.inner.config)
            .field("etag", &self.inner.current.load_full().map(|s| s.etag().to_string()))
            .finish_non_exhaustive()
    }
}

impl ServerCache {
    /// Create an empty cache fed by `source`.
    pub fn new(config: CacheConfig, source: impl ServerSource) -> Result<Self> {
        config.validate()?;
        let builder = SnapshotBuilder::new(config.min_version()?);
        let assets = AssetStore::empty(config.index_path.clone());
        Ok(Self {
            inner: Arc::new(CacheInner {
                config,
                builder,
                source: Box::new(source),
                current: ArcSwapOption::empty(),
                assets: ArcSwap::from_pointee(assets),
                refreshing: Mutex::new(()),
            }),
        })
    }

    /// Create a cache fed by the upstream directory described in `config`.
    pub fn from_config(config: CacheConfig) -> Result<Self> {
        let source = UpstreamSource::from_config(&config)?;
        Self::new(config, source)
    }

    /// Load assets, publish a first snapshot, then start the refresh loop.
    ///
    /// Failures are logged, not returned: a cache whose first refresh
    /// failed reports [`CacheError::NotInitialized`] until a later cycle
    /// succeeds.
    pub async fn init(&self) -> JoinHandle<()> {
        if let Err(e) = self.load_assets().await {
            warn!(error = %e, "asset load failed, serving no static assets");
        }
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "initial refresh failed, cache not yet initialized");
        }
        self.spawn_refresh_loop()
    }

    /// Load the static assets from the configured directory and swap them in.
    pub async fn load_assets(&self) -> Result<usize> {
        let dir = self.inner.config.public_dir.clone();
        let index_path = self.inner.config.index_path.clone();

        let store = tokio::task::spawn_blocking(move || AssetStore::load(&dir, &index_path))
            .await
            .map_err(|e| CacheError::Task(e.to_string()))??;

        let count = store.len();
        info!(
            dir = %self.inner.config.public_dir.display(),
            assets = count,
            template = store.has_template(),
            "loaded static assets"
        );
        self.inner.assets.store(Arc::new(store));
        Ok(count)
    }

    /// Run one fetch-build-publish cycle.
    ///
    /// On error the previously published snapshot stays in place.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let Ok(_guard) = self.inner.refreshing.try_lock() else {
            debug!("refresh already in flight, skipping");
            return Ok(RefreshOutcome::InFlight);
        };

        match self.fetch_and_build().await {
            Ok(snapshot) => {
                let stats = snapshot.stats();
                let outcome = RefreshOutcome::Published {
                    etag: snapshot.etag().to_string(),
                    servers: snapshot.len(),
                };
                info!(
                    etag = %snapshot.etag(),
                    received = stats.received,
                    ineligible = stats.ineligible,
                    duplicates = stats.duplicates,
                    servers = stats.published,
                    keys = snapshot.keys().len(),
                    "published snapshot"
                );
                self.inner.current.store(Some(Arc::new(snapshot)));
                Ok(outcome)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    serving = ?self.inner.current.load_full().map(|s| s.etag().to_string()),
                    "refresh failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    async fn fetch_and_build(&self) -> Result<Snapshot> {
        let raw = self.inner.source.fetch().await?;
        debug!(records = raw.len(), "fetched server listing");

        let builder = self.inner.builder;
        let assets = self.inner.assets.load_full();
        tokio::task::spawn_blocking(move || -> Result<Snapshot> {
            let snapshot = builder.build(raw)?;
            let index = assets.render_index(snapshot.payload(), snapshot.etag())?;
            Ok(snapshot.with_index(index))
        })
        .await
        .map_err(|e| CacheError::Task(e.to_string()))?
    }

    /// Refresh on the configured interval until the task is dropped or aborted.
    ///
    /// Cycles run one at a time; a failed cycle is retried at the next tick.
    pub fn spawn_refresh_loop(&self) -> JoinHandle<()> {
        let cache = self.clone();
        let period = self.inner.config.refresh_interval();

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if cache.refresh().await.is_err() {
                    debug!(next_in_secs = period.as_secs(), "refresh cycle contributed no update");
                }
            }
        })
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.inner.current.load_full().ok_or(CacheError::NotInitialized)
    }

    /// Whether a snapshot has been published.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.current.load().is_some()
    }

    /// Look up a server by name. The name is normalized first.
    pub fn get_server(&self, name: &str) -> Result<Option<Server>> {
        Ok(self.snapshot()?.server(&normalize(name)).cloned())
    }

    /// Look up a public key by id.
    pub fn get_key(&self, id: KeyId) -> Result<Option<String>> {
        Ok(self.snapshot()?.key(id).map(str::to_string))
    }

    /// Servers in a region; see [`Snapshot::region`].
    pub fn get_region(&self, country: Option<&str>, city: Option<&str>) -> Result<Vec<Server>> {
        Ok(self
            .snapshot()?
            .region(country, city)
            .into_iter()
            .cloned()
            .collect())
    }

    /// The serialized listing and its validation token.
    pub fn listing(&self) -> Result<Listing> {
        Ok(Listing::new(self.snapshot()?))
    }

    /// A static asset, or the derived index page for `/` and the index path.
    #[must_use]
    pub fn asset(&self, path: &str) -> Option<Arc<Asset>> {
        let assets = self.inner.assets.load();
        if assets.is_index(path) {
            return self.snapshot().ok()?.index().cloned();
        }
        assets.get(path)
    }

    /// The configuration this cache was built with.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }
}

//! nordgen-cache: refreshing snapshot cache of the NordVPN server directory.
//!
//! Serves the processed server directory to many concurrent readers while a
//! background task periodically refreshes it from upstream.
//!
//! # Architecture
//!
//! - **Snapshot**: an immutable bundle of servers, interned public keys,
//!   a country/city index, the serialized listing and its validation token
//! - **Builder**: turns a raw upstream listing into a snapshot, dropping
//!   ineligible records and later duplicates
//! - **Cache**: publishes snapshots by swapping one shared pointer, so reads
//!   never block on a refresh and never see a half-built snapshot
//! - **Assets**: static files loaded once at startup, plus an index page
//!   re-derived from every snapshot
//!
//! # Example
//!
//! ```rust,ignore
//! use nordgen_cache::{CacheConfig, ServerCache};
//!
//! #[tokio::main]
//! async fn main() -> nordgen_cache::Result<()> {
//!     let cache = ServerCache::from_config(CacheConfig::default())?;
//!     let _refresh = cache.init().await;
//!
//!     if let Some(server) = cache.get_server("united_states_1234")? {
//!         let key = cache.get_key(server.key_id)?;
//!         println!("{} -> {:?}", server.hostname, key);
//!     }
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod cache;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod source;

// Re-exports for convenience.
pub use assets::{Asset, AssetStore};
pub use cache::{RefreshOutcome, ServerCache};
pub use config::CacheConfig;
pub use error::CacheError;
pub use snapshot::{BuildStats, KeyTable, Listing, RegionIndex, Snapshot, SnapshotBuilder};
pub use source::{ServerSource, UpstreamSource};

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

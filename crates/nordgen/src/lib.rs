//! NordVPN server directory client and lock-free refreshing cache.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use nordgen::{CacheConfig, ServerCache};
//!
//! #[tokio::main]
//! async fn main() -> nordgen::cache::Result<()> {
//!     let cache = ServerCache::from_config(CacheConfig::default())?;
//!     let _refresh = cache.init().await;
//!
//!     // Every server in Germany, grouped by city
//!     for server in cache.get_region(Some("Germany"), None)? {
//!         println!("{} {}", server.city, server.hostname);
//!     }
//!
//!     // The listing for conditional HTTP responses
//!     let listing = cache.listing()?;
//!     println!("{} bytes, etag {}", listing.bytes().len(), listing.etag());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/nordgen/0.1.0")]

// Re-export core types
pub use nordgen_core::*;

// Re-export client
pub use nordgen_client::{NordClient, NordClientBuilder, RetryConfig};

// Re-export cache
pub use nordgen_cache as cache;
pub use nordgen_cache::{CacheConfig, CacheError, Listing, ServerCache, Snapshot};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;

//! nordgen-cache - keeps the NordVPN server directory warm in memory.

use anyhow::{Context, Result};
use clap::Parser;
use nordgen_cache::{CacheConfig, ServerCache};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Refreshing in-memory cache of the NordVPN server directory
#[derive(Debug, Parser)]
#[command(name = "nordgen-cache", version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "NORDGEN_CONFIG", default_value = "nordgen.toml")]
    config: PathBuf,

    /// Override the static asset directory
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Override the upstream API base URL
    #[arg(long)]
    upstream_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = CacheConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(dir) = args.public_dir {
        config.public_dir = dir;
    }
    if let Some(url) = args.upstream_url {
        config.upstream_url = url;
    }

    let cache = ServerCache::from_config(config)?;
    let refresh = cache.init().await;

    match cache.snapshot() {
        Ok(snapshot) => info!(
            servers = snapshot.len(),
            countries = snapshot.regions().country_count(),
            etag = %snapshot.etag(),
            "cache ready"
        ),
        Err(e) => info!(status = %e, "cache started without data, waiting for next refresh"),
    }

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutting down");
    refresh.abort();
    Ok(())
}

//! HTTP client for the NordVPN server directory.
//!
//! This crate provides [`NordClient`], which fetches and decodes the raw
//! server listing consumed by the cache.

#![doc(html_root_url = "https://docs.rs/nordgen-client/0.1.0")]

mod client;
mod config;
pub mod api;

pub use client::{NordClient, NordClientBuilder, DEFAULT_BASE_URL};
pub use config::*;
pub use nordgen_core::{NordError, Result};

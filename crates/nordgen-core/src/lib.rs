//! Core types and rules for the NordVPN server directory.
//!
//! This crate provides the foundational pieces shared by the client and cache crates:
//!
//! - **Types**: the upstream wire records ([`RawServer`]) and the processed [`Server`] entity
//! - **Normalization**: [`normalize`] maps free-text names onto a canonical key alphabet
//! - **Eligibility**: [`is_eligible`] decides whether a raw record can produce a config
//! - **Errors**: upstream error handling with [`NordError`]
//!
//! # Example
//!
//! ```rust
//! use nordgen_core::normalize;
//!
//! assert_eq!(normalize("United States"), "united_states");
//! assert_eq!(normalize("US #1"), "us_1");
//! ```

#![doc(html_root_url = "https://docs.rs/nordgen-core/0.1.0")]

mod eligibility;
mod error;
mod normalize;
pub mod types;

pub use eligibility::{is_eligible, MinVersion, ParseVersionError};
pub use error::{NordError, Result};
pub use normalize::{normalize, SEPARATOR};
pub use types::*;

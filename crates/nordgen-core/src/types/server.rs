use serde::{Deserialize, Serialize};
use std::fmt;

/// Interned identifier of a public key within one snapshot
///
/// Ids are assigned in first-seen order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(u32);

impl KeyId {
    /// The first id handed out by an interner
    pub const FIRST: Self = Self(1);

    /// Wrap a raw id
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw id
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A processed, eligible server
///
/// All name fields are normalized keys. The public key is referenced through
/// a [`KeyId`] that resolves in the key table of the snapshot that owns this server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Normalized server name (unique within a snapshot)
    pub name: String,

    /// DNS hostname endpoint
    pub hostname: String,

    /// Station (IP) endpoint
    pub station: String,

    /// Normalized country name
    pub country: String,

    /// Normalized city name
    pub city: String,

    /// Two-letter country code as advertised upstream
    pub code: String,

    /// Public key reference
    pub key_id: KeyId,
}

use serde::{Deserialize, Deserializer, Serialize};

/// Metadata name under which a technology block advertises its public key
pub const PUBLIC_KEY_METADATA: &str = "public_key";

/// Specification identifier carrying the server software version
pub const VERSION_SPECIFICATION: &str = "version";

/// Upstream sends `null` for absent values as often as it omits the field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A server record as returned by the upstream `/v1/servers` listing
///
/// Only the fields the cache consumes are modelled; everything else in the
/// upstream document is ignored during decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawServer {
    /// Display name (e.g. `"United States #1234"`)
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// DNS hostname of the server
    #[serde(default, deserialize_with = "null_as_default")]
    pub hostname: String,

    /// Station (IP) address of the server
    #[serde(default, deserialize_with = "null_as_default")]
    pub station: String,

    /// Current load percentage
    #[serde(default, deserialize_with = "null_as_default")]
    pub load: u32,

    /// Physical locations; only the first one is used
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<Location>,

    /// Supported technologies and their metadata
    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<Technology>,

    /// Server specifications (software version, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub specifications: Vec<Specification>,
}

impl RawServer {
    /// The primary location of the server
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.locations.first()
    }

    /// The first non-empty public key advertised by any technology block
    #[must_use]
    pub fn public_key(&self) -> Option<&str> {
        self.technologies.iter().find_map(Technology::public_key)
    }

    /// The advertised software version, if the record carries one
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.specifications
            .iter()
            .find(|s| s.identifier == VERSION_SPECIFICATION)
            .map(|s| s.values.first().map_or("", |v| v.value.as_str()))
    }
}

/// A server location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    /// Country (and nested city) of the location
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: Country,
}

/// Country information attached to a location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Country {
    /// Full country name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Two-letter country code
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,

    /// City within the country
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: City,
}

/// City information attached to a country
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct City {
    /// City name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A technology supported by a server (e.g. `wireguard_udp`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Technology {
    /// Technology identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub identifier: String,

    /// Named metadata entries
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Vec<Metadata>,
}

impl Technology {
    /// The public key metadata value, if present and non-empty
    #[must_use]
    pub fn public_key(&self) -> Option<&str> {
        self.metadata
            .iter()
            .find(|m| m.name == PUBLIC_KEY_METADATA && !m.value.is_empty())
            .map(|m| m.value.as_str())
    }
}

/// A named metadata value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Metadata name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Metadata value
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

/// A server specification block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Specification {
    /// Specification identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub identifier: String,

    /// Specification values
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<SpecificationValue>,
}

/// A single specification value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecificationValue {
    /// The value
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

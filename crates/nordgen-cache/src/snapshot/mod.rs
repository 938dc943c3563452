//! Immutable, internally consistent views of the processed server directory.
//!
//! A [`Snapshot`] bundles the server map, the interned key table, the
//! region index and the serialized listing. It is built entirely on
//! builder-local data (see [`builder`]) and never mutated once published,
//! so any reader holding an `Arc<Snapshot>` sees one coherent dataset.

pub mod builder;
pub mod etag;

use crate::assets::Asset;
use nordgen_core::{normalize, KeyId, Server};
use std::collections::HashMap;
use std::sync::Arc;

pub use builder::{build, SnapshotBuilder};

/// Public keys interned behind small integer ids, assigned in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    ids: HashMap<String, KeyId>,
    keys: Vec<String>,
}

impl KeyTable {
    /// Return the id for `key`, assigning the next one if unseen.
    pub fn intern(&mut self, key: &str) -> KeyId {
        if let Some(id) = self.ids.get(key) {
            return *id;
        }
        let id = KeyId::new(u32::try_from(self.keys.len() + 1).unwrap_or(u32::MAX));
        self.ids.insert(key.to_string(), id);
        self.keys.push(key.to_string());
        id
    }

    /// Resolve an id to its key.
    #[must_use]
    pub fn get(&self, id: KeyId) -> Option<&str> {
        let index = usize::try_from(id.get()).ok()?.checked_sub(1)?;
        self.keys.get(index).map(String::as_str)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when no key has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate `(id, key)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (KeyId, &str)> {
        (1u32..).map(KeyId::new).zip(self.keys.iter().map(String::as_str))
    }
}

/// country -> city -> positions into the snapshot's server list, in input order.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    countries: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl RegionIndex {
    pub(crate) fn insert(&mut self, country: &str, city: &str, position: usize) {
        self.countries
            .entry(country.to_string())
            .or_default()
            .entry(city.to_string())
            .or_default()
            .push(position);
    }

    /// Positions of the servers in one city.
    #[must_use]
    pub fn city(&self, country: &str, city: &str) -> Option<&[usize]> {
        self.countries.get(country)?.get(city).map(Vec::as_slice)
    }

    /// Positions of every server in a country, cities in name order.
    #[must_use]
    pub fn country(&self, country: &str) -> Option<Vec<usize>> {
        let cities = self.countries.get(country)?;
        let mut names: Vec<&String> = cities.keys().collect();
        names.sort();
        Some(names.into_iter().flat_map(|c| cities[c].iter().copied()).collect())
    }

    /// Number of countries.
    #[must_use]
    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Iterate `(country, city, positions)` buckets in no particular order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &str, &[usize])> {
        self.countries.iter().flat_map(|(country, cities)| {
            cities
                .iter()
                .map(move |(city, positions)| (country.as_str(), city.as_str(), positions.as_slice()))
        })
    }
}

/// Counters describing what one build kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Raw records received from upstream.
    pub received: usize,
    /// Records rejected by the eligibility rules.
    pub ineligible: usize,
    /// Eligible records dropped because an earlier record had the same name.
    pub duplicates: usize,
    /// Servers in the snapshot.
    pub published: usize,
}

/// One published view of the server directory.
#[derive(Debug)]
pub struct Snapshot {
    pub(crate) servers: Vec<Server>,
    pub(crate) by_name: HashMap<String, usize>,
    pub(crate) keys: KeyTable,
    pub(crate) regions: RegionIndex,
    pub(crate) payload: Vec<u8>,
    pub(crate) etag: String,
    pub(crate) stats: BuildStats,
    pub(crate) index: Option<Arc<Asset>>,
}

impl Snapshot {
    /// Look up a server by its normalized name.
    #[must_use]
    pub fn server(&self, name: &str) -> Option<&Server> {
        self.by_name.get(name).map(|i| &self.servers[*i])
    }

    /// Look up a public key by id.
    #[must_use]
    pub fn key(&self, id: KeyId) -> Option<&str> {
        self.keys.get(id)
    }

    /// A server together with its public key, both from this snapshot.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<(&Server, &str)> {
        let server = self.server(name)?;
        Some((server, self.key(server.key_id)?))
    }

    /// Servers in a region.
    ///
    /// Both inputs are normalized first. An empty country selects every
    /// server; an empty city selects the whole country. Unknown regions
    /// yield an empty list.
    #[must_use]
    pub fn region(&self, country: Option<&str>, city: Option<&str>) -> Vec<&Server> {
        let country = country.map(normalize).unwrap_or_default();
        let city = city.map(normalize).unwrap_or_default();

        if country.is_empty() {
            return self.servers.iter().collect();
        }

        let positions = if city.is_empty() {
            self.regions.country(&country).unwrap_or_default()
        } else {
            self.regions
                .city(&country, &city)
                .map(<[usize]>::to_vec)
                .unwrap_or_default()
        };

        positions.into_iter().map(|i| &self.servers[i]).collect()
    }

    /// All servers in input order.
    #[must_use]
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// The interned key table.
    #[must_use]
    pub const fn keys(&self) -> &KeyTable {
        &self.keys
    }

    /// The region index.
    #[must_use]
    pub const fn regions(&self) -> &RegionIndex {
        &self.regions
    }

    /// Serialized listing payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Validation token of this snapshot.
    #[must_use]
    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// Build counters.
    #[must_use]
    pub const fn stats(&self) -> BuildStats {
        self.stats
    }

    /// The index asset derived from this snapshot, if a template was loaded.
    #[must_use]
    pub fn index(&self) -> Option<&Arc<Asset>> {
        self.index.as_ref()
    }

    /// Number of servers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// True when the snapshot holds no servers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Attach the derived index asset before publication.
    pub(crate) fn with_index(mut self, index: Option<Asset>) -> Self {
        self.index = index.map(Arc::new);
        self
    }
}

/// The serialized listing and its validation token, pinned to one snapshot.
#[derive(Debug, Clone)]
pub struct Listing {
    snapshot: Arc<Snapshot>,
}

impl Listing {
    pub(crate) const fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    /// Payload bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.snapshot.payload()
    }

    /// Validation token.
    #[must_use]
    pub fn etag(&self) -> &str {
        self.snapshot.etag()
    }

    /// Whether a client-supplied `If-None-Match` value still matches.
    #[must_use]
    pub fn is_fresh(&self, if_none_match: Option<&str>) -> bool {
        etag::matches(if_none_match, self.etag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_table_interning() {
        let mut table = KeyTable::default();
        assert!(table.is_empty());
        let a = table.intern("K1");
        let b = table.intern("K2");
        let a_again = table.intern("K1");
        assert_eq!(a, KeyId::new(1));
        assert_eq!(b, KeyId::new(2));
        assert_eq!(a_again, a);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(a), Some("K1"));
        assert_eq!(table.get(b), Some("K2"));
        assert_eq!(table.get(KeyId::new(0)), None);
        assert_eq!(table.get(KeyId::new(3)), None);
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![(KeyId::new(1), "K1"), (KeyId::new(2), "K2")]
        );
    }

    #[test]
    fn test_region_index_country_orders_cities() {
        let mut index = RegionIndex::default();
        index.insert("germany", "munich", 0);
        index.insert("germany", "berlin", 1);
        index.insert("germany", "munich", 2);
        index.insert("france", "paris", 3);

        assert_eq!(index.city("germany", "munich"), Some(&[0, 2][..]));
        assert_eq!(index.country("germany"), Some(vec![1, 0, 2]));
        assert_eq!(index.country("spain"), None);
        assert_eq!(index.city("germany", "hamburg"), None);
        assert_eq!(index.country_count(), 2);
        assert_eq!(index.buckets().count(), 3);
    }
}

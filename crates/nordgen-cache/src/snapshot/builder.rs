//! Snapshot builder: turns a raw upstream listing into a [`Snapshot`].
//!
//! Records are processed in input order. Ineligible records are skipped,
//! and when two records normalize to the same name the first one wins.
//! Nothing is shared until [`SnapshotBuilder::build`] returns.

use nordgen_core::{normalize, ListingPayload, ListingRow, MinVersion, RawServer, Server};
use std::collections::HashMap;
use tracing::debug;

use super::{etag, BuildStats, KeyTable, RegionIndex, Snapshot};

/// Builds snapshots under a given eligibility floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotBuilder {
    floor: MinVersion,
}

impl SnapshotBuilder {
    /// Create a builder with the given version floor.
    #[must_use]
    pub const fn new(floor: MinVersion) -> Self {
        Self { floor }
    }

    /// Build a snapshot from raw records.
    pub fn build<I>(&self, raw: I) -> crate::Result<Snapshot>
    where
        I: IntoIterator<Item = RawServer>,
    {
        let mut servers = Vec::new();
        let mut by_name = HashMap::new();
        let mut keys = KeyTable::default();
        let mut regions = RegionIndex::default();
        let mut payload = ListingPayload::default();
        let mut stats = BuildStats::default();

        for record in raw {
            stats.received += 1;

            if !self.floor.is_eligible(&record) {
                stats.ineligible += 1;
                continue;
            }

            let name = normalize(&record.name);
            if by_name.contains_key(&name) {
                stats.duplicates += 1;
                continue;
            }

            // Both checked by the eligibility rules above.
            let (Some(public_key), Some(location)) = (record.public_key(), record.location()) else {
                stats.ineligible += 1;
                continue;
            };

            let key_id = keys.intern(public_key);
            let country = normalize(&location.country.name);
            let city = normalize(&location.country.city.name);
            let code = location.country.code.clone();

            payload.push(
                &country,
                &city,
                ListingRow(name.clone(), record.load, record.station.clone()),
            );

            let position = servers.len();
            regions.insert(&country, &city, position);
            by_name.insert(name.clone(), position);
            servers.push(Server {
                name,
                hostname: record.hostname,
                station: record.station,
                country,
                city,
                code,
                key_id,
            });
        }

        stats.published = servers.len();
        let payload = serde_json::to_vec(&payload)?;
        let etag = etag::next_snapshot_etag();

        debug!(
            received = stats.received,
            ineligible = stats.ineligible,
            duplicates = stats.duplicates,
            published = stats.published,
            keys = keys.len(),
            etag = %etag,
            "built snapshot"
        );

        Ok(Snapshot {
            servers,
            by_name,
            keys,
            regions,
            payload,
            etag,
            stats,
            index: None,
        })
    }
}

/// Build a snapshot with the default eligibility floor.
pub fn build<I>(raw: I) -> crate::Result<Snapshot>
where
    I: IntoIterator<Item = RawServer>,
{
    SnapshotBuilder::default().build(raw)
}

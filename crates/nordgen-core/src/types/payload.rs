use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column headers of every listing row
pub const LISTING_HEADERS: [&str; 3] = ["name", "load", "station"];

/// One compact listing row: `[name, load, station]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRow(pub String, pub u32, pub String);

/// The outward-facing server listing
///
/// Serializes as `{"h": [...headers], "l": {country: {city: [rows]}}}`.
/// Countries and cities are kept in key order so equal inputs produce
/// byte-identical payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPayload {
    /// Column headers
    #[serde(rename = "h")]
    pub headers: Vec<String>,

    /// country -> city -> rows
    #[serde(rename = "l")]
    pub list: BTreeMap<String, BTreeMap<String, Vec<ListingRow>>>,
}

impl Default for ListingPayload {
    fn default() -> Self {
        Self {
            headers: LISTING_HEADERS.iter().map(|h| (*h).to_string()).collect(),
            list: BTreeMap::new(),
        }
    }
}

impl ListingPayload {
    /// Append a row under the given country and city
    pub fn push(&mut self, country: &str, city: &str, row: ListingRow) {
        self.list
            .entry(country.to_string())
            .or_default()
            .entry(city.to_string())
            .or_default()
            .push(row);
    }

    /// Total number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.list
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

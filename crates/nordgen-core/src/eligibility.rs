//! Eligibility rules deciding which upstream records enter a snapshot.

use crate::RawServer;
use std::fmt;
use std::str::FromStr;

/// Minimum supported server software version (`major.minor`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinVersion {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
}

impl Default for MinVersion {
    fn default() -> Self {
        Self::new(2, 1)
    }
}

impl MinVersion {
    /// Create a version floor
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether an advertised version string meets this floor.
    ///
    /// Only `major.minor` is compared; trailing segments are ignored.
    /// Malformed strings never meet the floor.
    #[must_use]
    pub fn admits(&self, version: &str) -> bool {
        parse_major_minor(version).is_some_and(|v| v >= (self.major, self.minor))
    }

    /// Whether a raw record may be included in a snapshot.
    ///
    /// The record needs a location with a country code and a public key, and
    /// any advertised version must meet this floor. A record without a
    /// version specification makes no version claim and is not filtered on it.
    #[must_use]
    pub fn is_eligible(&self, record: &RawServer) -> bool {
        let Some(location) = record.location() else {
            return false;
        };
        if location.country.code.is_empty() || record.public_key().is_none() {
            return false;
        }
        record.version().is_none_or(|v| self.admits(v))
    }
}

/// [`MinVersion::is_eligible`] against the default floor
#[must_use]
pub fn is_eligible(record: &RawServer) -> bool {
    MinVersion::default().is_eligible(record)
}

/// Parse `major.minor[...]`, rejecting empty or non-digit components.
fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.');
    let major = parse_component(parts.next()?)?;
    let minor = parse_component(parts.next()?)?;
    Some((major, minor))
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for MinVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when a version floor cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version floor '{0}', expected MAJOR.MINOR")]
pub struct ParseVersionError(pub String);

impl FromStr for MinVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_major_minor(s.trim())
            .map(|(major, minor)| Self::new(major, minor))
            .ok_or_else(|| ParseVersionError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{City, Country, Location, Metadata, Specification, SpecificationValue, Technology};

    fn record(code: &str, key: Option<&str>, version: Option<&str>) -> RawServer {
        RawServer {
            name: "Test #1".into(),
            hostname: "test1.example.com".into(),
            station: "10.0.0.1".into(),
            load: 5,
            locations: vec![Location {
                country: Country {
                    name: "Testland".into(),
                    code: code.into(),
                    city: City { name: "Testville".into() },
                },
            }],
            technologies: key
                .map(|k| {
                    vec![Technology {
                        identifier: "wireguard_udp".into(),
                        metadata: vec![Metadata { name: "public_key".into(), value: k.into() }],
                    }]
                })
                .unwrap_or_default(),
            specifications: version
                .map(|v| {
                    vec![Specification {
                        identifier: "version".into(),
                        values: vec![SpecificationValue { value: v.into() }],
                    }]
                })
                .unwrap_or_default(),
        }
    }

    #[test]
    fn test_version_floor() {
        let floor = MinVersion::default();
        assert!(floor.admits("2.1"));
        assert!(floor.admits("2.1.0"));
        assert!(floor.admits("2.10.3"));
        assert!(floor.admits("3.0"));
        assert!(!floor.admits("2.0.9"));
        assert!(!floor.admits("1.99"));
        assert!(!floor.admits("0.0.0"));
    }

    #[test]
    fn test_malformed_versions_rejected() {
        let floor = MinVersion::default();
        for v in ["", "2", "2.", ".1", "v2.1", "2.x", "x.1", "2.1a", "99999999999.1", "+2.1"] {
            assert!(!floor.admits(v), "{v:?} should not meet the floor");
        }
    }

    #[test]
    fn test_eligible_record() {
        assert!(is_eligible(&record("US", Some("K1"), Some("2.1.0"))));
    }

    #[test]
    fn test_version_missing_is_admitted() {
        // Only a present version is checked against the floor.
        assert!(is_eligible(&record("US", Some("K1"), None)));
        assert!(MinVersion::new(9, 0).is_eligible(&record("US", Some("K1"), None)));
    }

    #[test]
    fn test_ineligible_records() {
        assert!(!is_eligible(&record("", Some("K1"), None)));
        assert!(!is_eligible(&record("US", None, None)));
        assert!(!is_eligible(&record("US", Some(""), None)));
        assert!(!is_eligible(&record("US", Some("K1"), Some("2.0.0"))));
        assert!(!is_eligible(&record("US", Some("K1"), Some("garbage"))));

        let mut no_location = record("US", Some("K1"), None);
        no_location.locations.clear();
        assert!(!is_eligible(&no_location));
    }

    #[test]
    fn test_custom_floor() {
        let floor: MinVersion = "1.0".parse().unwrap();
        assert!(floor.is_eligible(&record("US", Some("K1"), Some("1.5"))));
        assert!(!MinVersion::new(3, 0).is_eligible(&record("US", Some("K1"), Some("2.9"))));
    }

    #[test]
    fn test_parse_floor() {
        assert_eq!("2.1".parse::<MinVersion>().unwrap(), MinVersion::new(2, 1));
        assert_eq!(MinVersion::new(2, 1).to_string(), "2.1");
        assert!("two".parse::<MinVersion>().is_err());
    }
}

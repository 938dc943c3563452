//! Weak validation tokens for snapshots and assets.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Last snapshot token value handed out in this process.
static LAST_SNAPSHOT_TOKEN: AtomicU64 = AtomicU64::new(0);

/// A fresh snapshot token derived from the current time in nanoseconds.
///
/// Values are strictly increasing within the process, so two builds never
/// share a token even when the clock stalls or steps backwards.
#[must_use]
pub fn next_snapshot_etag() -> String {
    let now = Utc::now()
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0);

    let previous = LAST_SNAPSHOT_TOKEN
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or_else(|last| last);
    let token = now.max(previous.saturating_add(1));

    format!("W/\"{token:x}\"")
}

/// Token for a static asset: its size and load time in milliseconds.
#[must_use]
pub fn asset_etag(len: usize) -> String {
    let millis = Utc::now().timestamp_millis();
    format!("W/\"{len:x}-{millis:x}\"")
}

/// Whether a conditional request value matches `etag`.
///
/// Accepts `*` and comma-separated lists, as sent in `If-None-Match`.
#[must_use]
pub fn matches(if_none_match: Option<&str>, etag: &str) -> bool {
    let Some(header) = if_none_match else {
        return false;
    };
    header
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate == etag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_etags_are_unique_and_weak() {
        let tokens: Vec<String> = (0..1000).map(|_| next_snapshot_etag()).collect();
        let mut deduped = tokens.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), tokens.len());
        assert!(tokens.iter().all(|t| t.starts_with("W/\"") && t.ends_with('"')));
    }

    #[test]
    fn test_asset_etag_encodes_length() {
        let tag = asset_etag(255);
        assert!(tag.starts_with("W/\"ff-"), "{tag}");
    }

    #[test]
    fn test_matches() {
        let tag = "W/\"abc\"";
        assert!(matches(Some("W/\"abc\""), tag));
        assert!(matches(Some("W/\"zzz\", W/\"abc\""), tag));
        assert!(matches(Some("*"), tag));
        assert!(!matches(Some("W/\"abd\""), tag));
        assert!(!matches(None, tag));
    }
}

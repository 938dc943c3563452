//! Canonical key normalization for free-text upstream names.

/// Separator emitted in place of any run of non-alphanumeric characters
pub const SEPARATOR: char = '_';

/// Normalize free text into the canonical key alphabet.
///
/// ASCII letters are lowercased and ASCII digits pass through. Every other
/// run of characters collapses into a single [`SEPARATOR`], and the result
/// never starts or ends with one. The function is total and idempotent.
///
/// ```rust
/// use nordgen_core::normalize;
///
/// assert_eq!(normalize("  New York "), "new_york");
/// assert_eq!(normalize("US#1"), normalize("US_1"));
/// assert_eq!(normalize("---"), "");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push(SEPARATOR);
            }
            pending_separator = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_names() {
        assert_eq!(normalize("US #1"), "us_1");
        assert_eq!(normalize("United States"), "united_states");
        assert_eq!(normalize("New York"), "new_york");
        assert_eq!(normalize("Bosnia and Herzegovina"), "bosnia_and_herzegovina");
    }

    #[test]
    fn test_collapses_and_trims_separators() {
        assert_eq!(normalize("__a--b  c__"), "a_b_c");
        assert_eq!(normalize("#1"), "1");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n"), "");
    }

    #[test]
    fn test_non_ascii_becomes_separator() {
        assert_eq!(normalize("Zürich"), "z_rich");
        assert_eq!(normalize("São Paulo"), "s_o_paulo");
        assert_eq!(normalize("Ålesund"), "lesund");
    }

    #[test]
    fn test_distinct_punctuation_collides() {
        assert_eq!(normalize("US#1"), "us_1");
        assert_eq!(normalize("US_1"), "us_1");
    }

    proptest! {
        #[test]
        fn prop_idempotent(s in ".*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_canonical_alphabet(s in ".*") {
            let key = normalize(&s);
            prop_assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == SEPARATOR));
            prop_assert!(!key.starts_with(SEPARATOR));
            prop_assert!(!key.ends_with(SEPARATOR));
            prop_assert!(!key.contains("__"));
        }
    }
}

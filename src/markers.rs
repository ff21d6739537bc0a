//! Comment marker parsing
//!
//! Markers are declarative annotations embedded in source comments, one per
//! line, of the form `+key=value`. A key may appear on several lines attached
//! to the same declaration, so values accumulate in line order.

use std::collections::BTreeMap;
use std::ops::Deref;

/// The marker prefix commonly used by comment markers.
pub const DEFAULT_MARKER_PREFIX: &str = "+";

/// Markers attached to one declaration, keyed by marker name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers(BTreeMap<String, Vec<String>>);

impl Markers {
    /// Values recorded for the given key, empty if the marker is absent.
    pub fn values(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value recorded for the given key.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values(key).first().map(String::as_str)
    }

    /// True if the marker appears exactly once with the value `true`
    /// (case-insensitive).
    pub fn is_true(&self, key: &str) -> bool {
        match self.values(key) {
            [v] => v.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

impl Deref for Markers {
    type Target = BTreeMap<String, Vec<String>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Parse markers from comment text using the default `+` prefix.
pub fn parse_markers(comment: &str) -> Markers {
    parse_markers_with_prefix(DEFAULT_MARKER_PREFIX, comment)
}

/// Parse markers from comment text. Lines that do not start with the prefix
/// are ignored; a marker line without `=` records an empty value.
pub fn parse_markers_with_prefix(prefix: &str, comment: &str) -> Markers {
    let mut m: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for line in comment.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(rest) = line.strip_prefix(prefix) else {
            continue;
        };
        let (k, v) = match rest.split_once('=') {
            Some((k, v)) => (k, v),
            None => (rest, ""),
        };
        m.entry(k.to_string()).or_default().push(v.to_string());
    }

    Markers(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_markers() {
        let comment = "+crossplane:generate:reference:type=Foo\n+crossplane:generate:reference:extractor=Bar(1,2)\n";
        let m = parse_markers(comment);

        assert_eq!(
            m.values("crossplane:generate:reference:type"),
            &["Foo".to_string()]
        );
        assert_eq!(
            m.values("crossplane:generate:reference:extractor"),
            &["Bar(1,2)".to_string()]
        );
    }

    #[test]
    fn test_unprefixed_lines_ignored() {
        let m = parse_markers("This is prose.\n+key=value\nMore prose.\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m.first("key"), Some("value"));
    }

    #[test]
    fn test_missing_equals_records_empty_value() {
        let m = parse_markers("+standalone\n");
        assert_eq!(m.values("standalone"), &[String::new()]);
    }

    #[test]
    fn test_repeated_key_accumulates_in_order() {
        let m = parse_markers("+k=a\n+k=b\n");
        assert_eq!(m.values("k"), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_custom_prefix() {
        let m = parse_markers_with_prefix("#", "#k=v\n+k=ignored\n");
        assert_eq!(m.values("k"), &["v".to_string()]);
    }

    #[test]
    fn test_is_true() {
        let m = parse_markers("+enabled=True\n+repeated=true\n+repeated=true\n+off=false\n");
        assert!(m.is_true("enabled"));
        assert!(!m.is_true("repeated"));
        assert!(!m.is_true("off"));
        assert!(!m.is_true("absent"));
    }
}

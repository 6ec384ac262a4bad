//! Case-insensitive HTTP validation headers
//!
//! Servers and CDN edges disagree on header casing (`ETag` vs `etag`), so the
//! validators are read through an explicit case-insensitive mapping instead of
//! relying on whatever a particular HTTP client happens to do.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;

/// Strong validator header name
pub const ETAG: &str = "etag";

/// Weak validator header name
pub const LAST_MODIFIED: &str = "last-modified";

/// Header name/value mapping with case-insensitive names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationHeaders {
    entries: BTreeMap<String, String>,
}

impl ValidationHeaders {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from name/value pairs; later duplicates overwrite earlier ones
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.insert(name, value);
        }
        headers
    }

    /// Capture the headers of an HTTP response. Values that are not valid
    /// visible ASCII are dropped.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut headers = Self::new();
        for (name, value) in map {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str(), value);
            }
        }
        headers
    }

    /// Insert a header, normalizing the name
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Look up a header by name, ignoring case. Empty values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Strong validator
    pub fn etag(&self) -> Option<&str> {
        self.get(ETAG)
    }

    /// Weak validator
    pub fn last_modified(&self) -> Option<&str> {
        self.get(LAST_MODIFIED)
    }

    /// Whether either validator is present
    pub fn has_validators(&self) -> bool {
        self.etag().is_some() || self.last_modified().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

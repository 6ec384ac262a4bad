//! Cache validation decision
//!
//! Compares the validators returned by the existence probe with the ones
//! recorded for the same key. Rules are applied in order and the first one
//! that applies decides:
//!
//! 1. no recorded entry: fetch
//! 2. ETag on both sides: fetch unless equal
//! 3. Last-Modified on both sides: fetch unless equal
//! 4. nothing comparable: fetch
//!
//! Comparison of values is exact; only header names are case-insensitive.

use std::fmt;

use crate::app::headers::ValidationHeaders;

use super::store::{CacheKey, CacheTable};

/// Outcome of validating one key, with the rule that decided it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No entry recorded for the key
    NoEntry,
    /// Strong validators are equal
    EtagMatch,
    /// Strong validators differ
    EtagChanged,
    /// Weak validators are equal
    LastModifiedMatch,
    /// Weak validators differ
    LastModifiedChanged,
    /// Neither validator is present on both sides
    NoComparableValidator,
}

impl Decision {
    /// Whether this decision requires a transfer
    pub fn requires_fetch(self) -> bool {
        !matches!(self, Decision::EtagMatch | Decision::LastModifiedMatch)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Decision::NoEntry => "no cache entry",
            Decision::EtagMatch => "ETag match",
            Decision::EtagChanged => "ETag changed",
            Decision::LastModifiedMatch => "Last-Modified match",
            Decision::LastModifiedChanged => "Last-Modified changed",
            Decision::NoComparableValidator => "no comparable validator",
        };
        f.write_str(text)
    }
}

/// Decide how the stored entry for `key` relates to the probe headers
pub fn evaluate(table: &CacheTable, key: &CacheKey, probe: &ValidationHeaders) -> Decision {
    let Some(stored) = table.get(key) else {
        return Decision::NoEntry;
    };

    if let (Some(current), Some(recorded)) = (probe.etag(), stored.etag()) {
        return if current == recorded {
            Decision::EtagMatch
        } else {
            Decision::EtagChanged
        };
    }

    if let (Some(current), Some(recorded)) = (probe.last_modified(), stored.last_modified()) {
        return if current == recorded {
            Decision::LastModifiedMatch
        } else {
            Decision::LastModifiedChanged
        };
    }

    Decision::NoComparableValidator
}

/// Whether the resource behind `key` must be transferred again
pub fn needs_fetch(table: &CacheTable, key: &CacheKey, probe: &ValidationHeaders) -> bool {
    evaluate(table, key, probe).requires_fetch()
}

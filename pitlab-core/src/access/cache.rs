//! Frame cache — per-field most-recent observation matrix.
//!
//! A cached entry satisfies a request iff its covering range fully contains
//! the requested range; the hit is the sub-slice restricted to the request,
//! which is identical to what a fresh fetch of the narrower range would
//! produce. A miss always refetches the full requested range and replaces
//! the entry outright (no merging, no partial invalidation).

use crate::domain::ObservationMatrix;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug)]
struct CacheEntry {
    first: NaiveDate,
    last: NaiveDate,
    matrix: ObservationMatrix,
}

/// In-process cache of materialized field windows.
///
/// Caching is opt-in: a disabled cache never hits and never stores, so the
/// reader stays stateless at the cost of repeated storage round-trips.
#[derive(Debug)]
pub struct FrameCache {
    enabled: bool,
    entries: HashMap<String, CacheEntry>,
}

impl FrameCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: HashMap::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Serve [start, end] from the cached entry for `field`, if the entry's
    /// coverage contains the whole request.
    pub fn try_get(
        &self,
        field: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Option<ObservationMatrix> {
        if !self.enabled {
            return None;
        }
        let entry = self.entries.get(field)?;
        if entry.first <= start && end <= entry.last {
            Some(entry.matrix.slice(start, end))
        } else {
            None
        }
    }

    /// Replace the entry for `field` with a freshly fetched matrix.
    ///
    /// Coverage is the *requested* range of the fetch, not the materialized
    /// rows' min/max, so a repeat of the same request hits even when the
    /// range edges carried no observations.
    pub fn put(&mut self, field: &str, matrix: ObservationMatrix, start: NaiveDate, end: NaiveDate) {
        if !self.enabled {
            return;
        }
        self.entries.insert(
            field.to_string(),
            CacheEntry {
                first: start,
                last: end,
                matrix,
            },
        );
    }

    /// Coverage of the current entry for `field`, if any.
    pub fn coverage(&self, field: &str) -> Option<(NaiveDate, NaiveDate)> {
        self.entries.get(field).map(|e| (e.first, e.last))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

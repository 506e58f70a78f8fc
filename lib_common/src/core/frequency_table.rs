//! # Concurrent Hashtag Frequency Table
//!
//! A key -> count map shared between the many short-lived line tasks spawned
//! by the ingestion loop and the periodic stats reporter. All locking is
//! internal; callers never synchronize around it.
//!
//! `top_k` is an eventually-consistent read: it copies the entries under the
//! lock and sorts the copy afterwards, so writers are only blocked for the
//! duration of the copy. A snapshot may be stale by a few in-flight
//! increments, which is acceptable for diagnostic reporting.
//!
//! Key cardinality is unbounded for the lifetime of the session. That is an
//! accepted limitation of this design, not something the table tries to fix.

use std::collections::HashMap;
use std::sync::Mutex;

/// Thread-safe mapping from hashtag text (leading `#` included) to the number
/// of times it has been observed since the session started.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: Mutex<HashMap<String, u64>>,
}

impl FrequencyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts `token` with count 1, or atomically increments its count by 1.
    ///
    /// Safe under arbitrary concurrent callers; increments are never lost.
    pub fn increment(&self, token: &str) {
        let mut counts = self.counts.lock().expect("FrequencyTable lock poisoned");
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }

    /// Returns up to `k` entries sorted by count descending.
    ///
    /// Ties are broken deterministically by token, lexicographically
    /// ascending. `k == 0` returns an empty vec; `k >= len()` returns every
    /// entry.
    pub fn top_k(&self, k: usize) -> Vec<(String, u64)> {
        if k == 0 {
            return Vec::new();
        }
        let mut entries: Vec<(String, u64)> = {
            let counts = self.counts.lock().expect("FrequencyTable lock poisoned");
            counts.iter().map(|(tag, n)| (tag.clone(), *n)).collect()
        };
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(k);
        entries
    }

    /// Number of distinct hashtags currently tracked.
    pub fn len(&self) -> usize {
        self.counts.lock().expect("FrequencyTable lock poisoned").len()
    }

    /// True when no hashtag has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry. Used by tests and session resets only.
    pub fn clear(&self) {
        self.counts.lock().expect("FrequencyTable lock poisoned").clear();
    }

    /// Current count for a single token, 0 when absent.
    pub fn count(&self, token: &str) -> u64 {
        self.counts
            .lock()
            .expect("FrequencyTable lock poisoned")
            .get(token)
            .copied()
            .unwrap_or(0)
    }
}

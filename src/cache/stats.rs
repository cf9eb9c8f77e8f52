//! Cache Statistics Module
//!
//! Aggregate views produced by the cleanup process.

use serde::{Deserialize, Serialize};

// == Cache Stats ==
/// Aggregate view over the live entries of a store.
///
/// Computed on demand; nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries that have not expired at computation time
    pub total_entries: usize,
    /// Entries removed by the most recent cleanup pass
    pub expired_removed: usize,
    /// Sum of hit counts across live entries
    pub total_hits: u64,
    /// Sum of serialized value sizes across live entries
    pub approximate_size_bytes: usize,
    /// Reads that found no live entry since the store was created
    pub misses: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates hits / (hits + misses), or 0.0 if nothing has been read.
    ///
    /// Hits only count entries that are still live, so this is a lower bound.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_hits.saturating_add(self.misses);
        if total == 0 {
            0.0
        } else {
            self.total_hits as f64 / total as f64
        }
    }
}

// == Cleanup Report ==
/// Outcome of a single cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Expired entries removed by the pass
    pub removed_count: usize,
    /// Entries left in the store after the pass
    pub remaining_count: usize,
}

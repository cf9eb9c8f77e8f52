//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access metadata.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// All timestamps are Unix milliseconds as read from the store's clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// Request fingerprint this entry is stored under
    pub key: String,
    /// The cached payload
    pub value: V,
    /// Insertion timestamp
    pub created_at: u64,
    /// Timestamp from which the entry is stale (`created_at + ttl`)
    pub expires_at: u64,
    /// Timestamp of the most recent successful read
    pub last_accessed_at: u64,
    /// Number of successful reads
    pub hit_count: u64,
    /// Serialized size of `value` in bytes, measured on insert
    pub size_bytes: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry that expires `ttl_seconds` after `now_ms`.
    ///
    /// # Arguments
    /// * `key` - Fingerprint of the cached request
    /// * `value` - The value to store
    /// * `ttl_seconds` - Lifetime in seconds
    /// * `size_bytes` - Serialized size of `value`
    /// * `now_ms` - Current time from the store's clock
    pub fn new(key: String, value: V, ttl_seconds: u64, size_bytes: usize, now_ms: u64) -> Self {
        Self {
            key,
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_seconds.saturating_mul(1000)),
            last_accessed_at: now_ms,
            hit_count: 0,
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once `now_ms >= expires_at`, so
    /// it is valid only while `expires_at > now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Record Hit ==
    /// Accounts for one successful read.
    ///
    /// `last_accessed_at` never moves backwards even if the clock does.
    pub fn record_hit(&mut self, now_ms: u64) {
        self.hit_count = self.hit_count.saturating_add(1);
        self.last_accessed_at = self.last_accessed_at.max(now_ms);
    }
}

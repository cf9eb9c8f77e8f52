//! Cache Store Module
//!
//! HashMap storage with per-entry TTL, lazy expiry on read and an eager
//! cleanup pass.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, CleanupReport, Clock, SystemClock, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Single-owner cache storage. Wrap it in a [`CacheManager`](crate::cache::CacheManager)
/// to share it between tasks.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Fingerprint to entry
    entries: HashMap<String, CacheEntry<V>>,
    /// Source of every timestamp the store records or compares
    clock: Arc<dyn Clock>,
    /// Removed count of the most recent cleanup pass
    last_removed: usize,
    /// Reads that found no live entry
    misses: u64,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
            last_removed: 0,
            misses: 0,
        }
    }

    /// Current time according to the store's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Set ==
    /// Stores a value under `key` for `ttl_seconds`.
    ///
    /// An existing entry is replaced by a fresh one: timestamps restart and
    /// the hit count returns to zero.
    ///
    /// # Arguments
    /// * `key` - Request fingerprint, 1..=256 bytes
    /// * `value` - Payload; its JSON encoding is measured for size statistics
    /// * `ttl_seconds` - Lifetime, must be positive
    pub fn set(&mut self, key: String, value: V, ttl_seconds: u64) -> Result<()>
    where
        V: Serialize,
    {
        validate_key(&key)?;

        if ttl_seconds == 0 {
            return Err(CacheError::InvalidArgument(
                "TTL must be greater than zero".to_string(),
            ));
        }

        let size_bytes = serde_json::to_vec(&value)
            .map_err(|e| {
                CacheError::InvalidArgument(format!("Value is not serializable: {}", e))
            })?
            .len();

        let entry = CacheEntry::new(key.clone(), value, ttl_seconds, size_bytes, self.now_ms());
        self.entries.insert(key, entry);

        Ok(())
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// A hit bumps the entry's hit count and access time. An entry that is
    /// present but expired is removed on the spot and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let now = self.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.misses = self.misses.saturating_add(1);
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.misses = self.misses.saturating_add(1);
            debug!(key, "lazily evicted expired entry");
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_hit(now);
        Some(entry.value.clone())
    }

    // == Entry ==
    /// Returns the metadata of a live entry without counting a hit.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        let now = self.now_ms();
        self.entries.get(key).filter(|entry| !entry.is_expired(now))
    }

    // == Invalidate ==
    /// Removes `key` whether or not it has expired.
    ///
    /// Returns `false` when nothing was stored under `key`.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Cleanup ==
    /// Removes every entry that has expired at the time of the pass.
    ///
    /// The clock is read once, so entries that are still valid at the start of
    /// the pass are never removed by it.
    pub fn cleanup(&mut self) -> CleanupReport {
        let now = self.now_ms();
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_expired(now));

        let remaining_count = self.entries.len();
        let removed_count = before - remaining_count;
        self.last_removed = removed_count;

        CleanupReport {
            removed_count,
            remaining_count,
        }
    }

    // == Stats ==
    /// Aggregates over live entries. Does not evict or touch hit counts.
    pub fn stats(&self) -> CacheStats {
        let now = self.now_ms();
        let mut stats = CacheStats {
            expired_removed: self.last_removed,
            misses: self.misses,
            ..Default::default()
        };

        // Restored hit counts come from disk, so the sums saturate
        for entry in self.entries.values().filter(|e| !e.is_expired(now)) {
            stats.total_entries += 1;
            stats.total_hits = stats.total_hits.saturating_add(entry.hit_count);
            stats.approximate_size_bytes =
                stats.approximate_size_bytes.saturating_add(entry.size_bytes);
        }

        stats
    }

    // == Sweep ==
    /// Runs a cleanup pass and computes stats from the state it left behind.
    ///
    /// Both results come from the same `&mut` borrow, so no write can land
    /// between them.
    pub fn sweep(&mut self) -> (CleanupReport, CacheStats) {
        let report = self.cleanup();
        (report, self.stats())
    }

    // == Size ==
    /// Number of entries held, including expired ones not yet swept.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Number of entries that have not expired.
    pub fn live_size(&self) -> usize {
        let now = self.now_ms();
        self.entries.values().filter(|e| !e.is_expired(now)).count()
    }

    /// Returns true if the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Snapshot Support ==
    /// Iterates over every held entry, expired or not.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry<V>> {
        self.entries.values()
    }

    /// Loads previously persisted entries, skipping those already expired.
    ///
    /// Restored entries keep their timestamps and hit counts. The stored
    /// `size_bytes` is not trusted: it is measured again from the value, and
    /// entries whose value no longer serializes are skipped. Returns the
    /// number of entries restored.
    pub fn restore(&mut self, entries: impl IntoIterator<Item = CacheEntry<V>>) -> usize
    where
        V: Serialize,
    {
        let now = self.now_ms();
        let mut restored = 0;

        for mut entry in entries {
            if entry.is_expired(now) || validate_key(&entry.key).is_err() {
                continue;
            }
            match serde_json::to_vec(&entry.value) {
                Ok(encoded) => entry.size_bytes = encoded.len(),
                Err(e) => {
                    debug!(key = %entry.key, error = %e, "skipped unserializable snapshot entry");
                    continue;
                }
            }
            self.entries.insert(entry.key.clone(), entry);
            restored += 1;
        }

        restored
    }
}

// == Key Validation ==
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument(
            "Key cannot be empty".to_string(),
        ));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidArgument(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

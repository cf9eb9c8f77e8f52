//! Cache Manager Module
//!
//! Shareable handle around a [`CacheStore`]: one reader/writer lock over the
//! whole map, optional snapshot persistence and an explicit shutdown hook.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{snapshot, CacheStats, CacheStore, CleanupReport, Clock};
use crate::config::{Config, DEFAULT_TTL_SECS};
use crate::error::{CacheError, Result};

// == Cache Manager ==
/// Thread-safe cache handle. Clones share the same store.
///
/// Reads that account hits (`get`) and all mutations take the write lock;
/// `stats`, `size` and `live_size` share the read lock. After [`shutdown`]
/// every operation fails with `StorageUnavailable`.
///
/// The closed flag only flips while the write lock is held, and every
/// operation checks it while holding a guard.
///
/// [`shutdown`]: CacheManager::shutdown
#[derive(Debug)]
pub struct CacheManager<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    closed: Arc<AtomicBool>,
    /// Serializes snapshot encode + file write so an older flush cannot
    /// overwrite a newer file
    persist: Arc<Mutex<()>>,
    snapshot_path: Option<Arc<PathBuf>>,
    default_ttl: u64,
}

impl<V> Clone for CacheManager<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            closed: Arc::clone(&self.closed),
            persist: Arc::clone(&self.persist),
            snapshot_path: self.snapshot_path.clone(),
            default_ttl: self.default_ttl,
        }
    }
}

impl<V> CacheManager<V> {
    // == Constructors ==
    /// Wraps an in-memory store.
    pub fn new(store: CacheStore<V>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            closed: Arc::new(AtomicBool::new(false)),
            persist: Arc::new(Mutex::new(())),
            snapshot_path: None,
            default_ttl: DEFAULT_TTL_SECS,
        }
    }

    /// Sets the TTL used by [`put`](Self::put).
    pub fn with_default_ttl(mut self, ttl_seconds: u64) -> Self {
        self.default_ttl = ttl_seconds;
        self
    }

    /// Wraps a store that is flushed to `path` on [`flush`](Self::flush) and shutdown.
    pub fn with_snapshot(store: CacheStore<V>, path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: Some(Arc::new(path.into())),
            ..Self::new(store)
        }
    }

    /// Builds a manager from configuration, restoring the snapshot if one is
    /// configured and present.
    ///
    /// # Errors
    /// `StorageUnavailable` if the snapshot exists but cannot be read or parsed.
    pub async fn open(config: &Config, clock: Arc<dyn Clock>) -> Result<Self>
    where
        V: Serialize + DeserializeOwned,
    {
        let mut store = CacheStore::new(clock);

        let Some(path) = config.snapshot_path.as_deref() else {
            return Ok(Self::new(store).with_default_ttl(config.default_ttl));
        };

        match snapshot::load::<V>(path).await? {
            Some(entries) => {
                let restored = store.restore(entries);
                info!(path = %path.display(), restored, "restored cache snapshot");
            }
            None => debug!(path = %path.display(), "no cache snapshot yet"),
        }

        Ok(Self::with_snapshot(store, path).with_default_ttl(config.default_ttl))
    }

    /// Snapshot file this manager persists to, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref().map(PathBuf::as_path)
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Call with a store guard held so shutdown cannot slip in between.
    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(CacheError::StorageUnavailable(
                "cache manager has been shut down".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    // == Producer / Consumer Surface ==
    /// See [`CacheStore::get`]. `Ok(None)` means absent or expired.
    pub async fn get(&self, key: &str) -> Result<Option<V>>
    where
        V: Clone,
    {
        let mut store = self.store.write().await;
        self.ensure_open()?;
        Ok(store.get(key))
    }

    /// See [`CacheStore::set`].
    pub async fn set(&self, key: impl Into<String>, value: V, ttl_seconds: u64) -> Result<()>
    where
        V: Serialize,
    {
        let mut store = self.store.write().await;
        self.ensure_open()?;
        store.set(key.into(), value, ttl_seconds)
    }

    /// Stores `value` for the manager's default TTL.
    pub async fn put(&self, key: impl Into<String>, value: V) -> Result<()>
    where
        V: Serialize,
    {
        self.set(key, value, self.default_ttl).await
    }

    /// See [`CacheStore::invalidate`].
    pub async fn invalidate(&self, key: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        self.ensure_open()?;
        Ok(store.invalidate(key))
    }

    /// Entries held, including expired ones not yet swept.
    pub async fn size(&self) -> Result<usize> {
        let store = self.store.read().await;
        self.ensure_open()?;
        Ok(store.size())
    }

    /// Entries that have not expired.
    pub async fn live_size(&self) -> Result<usize> {
        let store = self.store.read().await;
        self.ensure_open()?;
        Ok(store.live_size())
    }

    // == Cleanup Process ==
    /// Removes all expired entries. See [`CacheStore::cleanup`].
    pub async fn cleanup(&self) -> Result<CleanupReport> {
        let mut store = self.store.write().await;
        self.ensure_open()?;
        Ok(store.cleanup())
    }

    /// Aggregate statistics over live entries. Never evicts.
    pub async fn stats(&self) -> Result<CacheStats> {
        let store = self.store.read().await;
        self.ensure_open()?;
        Ok(store.stats())
    }

    /// Cleanup followed by stats under a single write lock.
    pub async fn sweep(&self) -> Result<(CleanupReport, CacheStats)> {
        let mut store = self.store.write().await;
        self.ensure_open()?;
        Ok(store.sweep())
    }

    // == Persistence ==
    /// Writes the current entries to the snapshot file. No-op without one.
    pub async fn flush(&self) -> Result<()>
    where
        V: Serialize,
    {
        let _persist = self.persist.lock().await;
        let encoded = {
            let store = self.store.read().await;
            self.ensure_open()?;
            self.encode_snapshot(&store)?
        };
        self.write_snapshot(encoded).await
    }

    /// Flushes the snapshot and closes the manager. Calling it again is a no-op.
    ///
    /// The manager is closed and the snapshot encoded under one write lock.
    /// Every write that returned `Ok` is in the flushed file, and every later
    /// operation fails with `StorageUnavailable`.
    pub async fn shutdown(&self) -> Result<()>
    where
        V: Serialize,
    {
        let _persist = self.persist.lock().await;
        let encoded = {
            let store = self.store.write().await;
            if self.closed.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
            self.encode_snapshot(&store)
        };

        let result = match encoded {
            Ok(encoded) => self.write_snapshot(encoded).await,
            Err(e) => Err(e),
        };
        match &result {
            Ok(()) => info!("cache manager shut down"),
            Err(e) => warn!(error = %e, "cache snapshot flush failed during shutdown"),
        }
        result
    }

    /// Encodes the store for the snapshot file, or `None` without a path.
    fn encode_snapshot(&self, store: &CacheStore<V>) -> Result<Option<(Vec<u8>, usize)>>
    where
        V: Serialize,
    {
        if self.snapshot_path.is_none() {
            return Ok(None);
        }
        let bytes = snapshot::encode(store.entries(), store.now_ms())?;
        Ok(Some((bytes, store.size())))
    }

    /// Writes an encoded snapshot. Runs without any store guard held.
    async fn write_snapshot(&self, encoded: Option<(Vec<u8>, usize)>) -> Result<()> {
        let (Some(path), Some((bytes, count))) = (self.snapshot_path.as_deref(), encoded) else {
            return Ok(());
        };

        snapshot::write(path, &bytes).await?;
        info!(path = %path.display(), entries = count, "cache snapshot flushed");
        Ok(())
    }
}

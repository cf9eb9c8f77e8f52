//! Snapshot Module
//!
//! JSON persistence of cache entries, so a restart does not throw away
//! generated results that are still valid.
//!
//! Layout: `{ "version": 1, "savedAt": <ms>, "entries": [CacheEntry, ...] }`.
//! Files are written to `<path>.tmp` and renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

/// Snapshot layout version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOut<'a, V> {
    version: u32,
    saved_at: u64,
    entries: Vec<&'a CacheEntry<V>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotIn<V> {
    version: u32,
    #[allow(dead_code)]
    saved_at: u64,
    entries: Vec<CacheEntry<V>>,
}

// == Encode ==
/// Serializes entries into snapshot bytes.
pub fn encode<'a, V, I>(entries: I, saved_at: u64) -> Result<Vec<u8>>
where
    V: Serialize + 'a,
    I: IntoIterator<Item = &'a CacheEntry<V>>,
{
    let snapshot = SnapshotOut {
        version: SNAPSHOT_VERSION,
        saved_at,
        entries: entries.into_iter().collect(),
    };

    serde_json::to_vec(&snapshot)
        .map_err(|e| CacheError::Internal(format!("Failed to encode snapshot: {}", e)))
}

// == Write ==
/// Atomically replaces the snapshot at `path` with `bytes`.
pub async fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| storage_error("create snapshot directory", parent, e))?;
    }

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| storage_error("write snapshot", &tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| storage_error("replace snapshot", path, e))?;

    debug!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
}

// == Load ==
/// Reads entries from the snapshot at `path`.
///
/// A missing file yields `Ok(None)`. Unreadable, corrupt or foreign-version
/// files are `StorageUnavailable`, never silently treated as empty.
pub async fn load<V: DeserializeOwned>(path: &Path) -> Result<Option<Vec<CacheEntry<V>>>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(storage_error("read snapshot", path, e)),
    };

    let snapshot: SnapshotIn<V> = serde_json::from_slice(&bytes).map_err(|e| {
        CacheError::StorageUnavailable(format!(
            "Corrupt snapshot {}: {}",
            path.display(),
            e
        ))
    })?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(CacheError::StorageUnavailable(format!(
            "Unsupported snapshot version {} in {}",
            snapshot.version,
            path.display()
        )));
    }

    Ok(Some(snapshot.entries))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> CacheError {
    CacheError::StorageUnavailable(format!("Failed to {} {}: {}", action, path.display(), err))
}

//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheManager;
use crate::error::CacheError;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task sleeps for the interval, then runs a cleanup pass under the
/// manager's write lock. It stops on its own once the manager is shut down.
///
/// # Arguments
/// * `cache` - Shared cache handle
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = CacheManager::<serde_json::Value>::new(CacheStore::default());
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 300);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(cache: CacheManager<V>, cleanup_interval_secs: u64) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            match cache.cleanup().await {
                Ok(report) if report.removed_count > 0 => {
                    info!(
                        removed = report.removed_count,
                        remaining = report.remaining_count,
                        "TTL cleanup: removed expired entries"
                    );
                }
                Ok(_) => debug!("TTL cleanup: no expired entries found"),
                Err(CacheError::StorageUnavailable(reason)) => {
                    info!(%reason, "TTL cleanup task stopping");
                    break;
                }
                Err(e) => warn!(error = %e, "TTL cleanup pass failed"),
            }
        }
    })
}

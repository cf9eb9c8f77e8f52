//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default TTL in seconds for entries stored without an explicit TTL.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Shared secret expected as the bearer token on the cleanup endpoint
    pub cron_secret: Option<String>,
    /// File the cache is persisted to; memory only when unset
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 300)
    /// - `CRON_SECRET` - Bearer secret for the cleanup endpoint (default: unset,
    ///   every cleanup request is rejected)
    /// - `CACHE_SNAPSHOT_PATH` - Snapshot file (default: unset, memory only)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    ///
    /// Unparsable numbers fall back to their defaults; empty strings count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            default_ttl: non_empty("DEFAULT_TTL")
                .and_then(|v| v.parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.default_ttl),
            server_port: non_empty("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: non_empty("CLEANUP_INTERVAL")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            cron_secret: non_empty("CRON_SECRET"),
            snapshot_path: non_empty("CACHE_SNAPSHOT_PATH").map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECS,
            server_port: 3000,
            cleanup_interval: 300,
            cron_secret: None,
            snapshot_path: None,
        }
    }
}

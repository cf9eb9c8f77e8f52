//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::Value;
use tracing::info;

use crate::api::auth::authorize;
use crate::cache::{CacheManager, CacheStore, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::models::{CleanupResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// Holds the single cache handle for the process; cached values are opaque
/// JSON documents (generated workflow results).
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache handle
    pub cache: CacheManager<Value>,
    /// Bearer secret for admin endpoints
    pub cron_secret: Option<Arc<str>>,
}

impl AppState {
    /// Creates a new AppState around an existing cache handle.
    pub fn new(cache: CacheManager<Value>, cron_secret: Option<&str>) -> Self {
        Self {
            cache,
            cron_secret: cron_secret.map(Arc::from),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Restores the snapshot named by the config, if any.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let cache = CacheManager::open(config, Arc::new(SystemClock)).await?;
        Ok(Self::new(cache, config.cron_secret.as_deref()))
    }

    /// In-memory state with a wall-clock store.
    pub fn in_memory(cron_secret: Option<&str>) -> Self {
        Self::new(CacheManager::new(CacheStore::default()), cron_secret)
    }
}

/// Handler for POST /api/cache/cleanup
///
/// Removes expired entries and returns the statistics left behind by that
/// same pass. The cache is not touched when authorization fails.
pub async fn cleanup_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CleanupResponse>> {
    authorize(&headers, state.cron_secret.as_deref())?;

    let (report, stats) = state.cache.sweep().await?;
    info!(
        removed = report.removed_count,
        remaining = report.remaining_count,
        "cache cleanup completed"
    );

    Ok(Json(CleanupResponse::new(stats)))
}

/// Handler for GET /api/cache/stats
///
/// Returns current statistics without running a cleanup pass.
pub async fn stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>> {
    authorize(&headers, state.cron_secret.as_deref())?;

    let stats = state.cache.stats().await?;
    Ok(Json(StatsResponse::new(stats)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

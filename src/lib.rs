//! Forge Cache - TTL key/value cache for generated workflow results
//!
//! Lazy expiry on read, an eager cleanup pass, usage statistics and a
//! bearer-gated HTTP endpoint that triggers cleanup.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheManager, CacheStats, CacheStore, CleanupReport};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;

//! Cache Module
//!
//! TTL key/value cache for generated results, with lazy expiry on read, an
//! eager cleanup pass and aggregate usage statistics.

mod clock;
mod entry;
mod fingerprint;
mod manager;
pub mod snapshot;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use fingerprint::fingerprint;
pub use manager::CacheManager;
pub use stats::{CacheStats, CleanupReport};
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

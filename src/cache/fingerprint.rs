//! Request fingerprints used as cache keys.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Derives a deterministic cache key from request parameters.
///
/// Parameters are first converted to a `serde_json::Value`, whose objects keep
/// their keys sorted, so field order never changes the fingerprint. The
/// canonical JSON text is hashed with SHA-256 and hex encoded (64 chars).
pub fn fingerprint<P: Serialize + ?Sized>(params: &P) -> Result<String> {
    let canonical = serde_json::to_value(params)
        .and_then(|value| serde_json::to_vec(&value))
        .map_err(|e| CacheError::InvalidArgument(format!("Unfingerprintable parameters: {}", e)))?;

    Ok(hex::encode(Sha256::digest(&canonical)))
}

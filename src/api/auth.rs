//! Bearer Authentication
//!
//! Shared-secret check guarding the administrative cache endpoints.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::{CacheError, Result};

/// Verifies `Authorization: Bearer <token>` against the configured secret.
///
/// The comparison is constant time. With no secret configured every request
/// is rejected, so an unset `CRON_SECRET` never opens the endpoint.
///
/// # Errors
/// [`CacheError::Unauthorized`] when the header is missing, malformed or wrong.
pub fn authorize(headers: &HeaderMap, expected: Option<&str>) -> Result<()> {
    let Some(expected) = expected else {
        warn!("rejecting cache admin request: no secret configured");
        return Err(CacheError::Unauthorized);
    };

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(CacheError::Unauthorized)?;

    if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(CacheError::Unauthorized)
    }
}

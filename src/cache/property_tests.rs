//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a simple model driven by a
//! manual clock, so no test ever sleeps.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheStore, Clock, ManualClock};

// == Test Configuration ==
const T0: u64 = 1_700_000_000_000;

fn new_store() -> (CacheStore<Value>, ManualClock) {
    let clock = ManualClock::new(T0);
    (CacheStore::new(Arc::new(clock.clone())), clock)
}

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}".prop_map(|s| s)
}

/// Small key space so operations collide on the same entries
fn colliding_key_strategy() -> impl Strategy<Value = String> {
    "[a-d]{1,2}".prop_map(|s| s)
}

/// Generates JSON payloads of varying shape
fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,64}".prop_map(|s| json!(s)),
        (any::<u8>(), "[a-z]{1,8}").prop_map(|(n, s)| json!({"nodes": n, "name": s})),
    ]
}

/// A step in a randomized cache session
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value, ttl: u64 },
    Get { key: String },
    Invalidate { key: String },
    Advance { ms: u64 },
    Cleanup,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (colliding_key_strategy(), value_strategy(), 1u64..10)
            .prop_map(|(key, value, ttl)| CacheOp::Set { key, value, ttl }),
        3 => colliding_key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => colliding_key_strategy().prop_map(|key| CacheOp::Invalidate { key }),
        2 => (0u64..5_000).prop_map(|ms| CacheOp::Advance { ms }),
        1 => Just(CacheOp::Cleanup),
    ]
}

/// Reference model: key -> (value, expires_at, hits)
type Model = HashMap<String, (Value, u64, u64)>;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Storing then immediately reading returns the value with one hit recorded.
    #[test]
    fn prop_set_then_get(
        key in valid_key_strategy(),
        value in value_strategy(),
        ttl in 1u64..100_000
    ) {
        let (mut store, _) = new_store();

        store.set(key.clone(), value.clone(), ttl).unwrap();
        let retrieved = store.get(&key);
        prop_assert_eq!(retrieved, Some(value));

        let entry = store.entry(&key).unwrap();
        prop_assert_eq!(entry.hit_count, 1);
        prop_assert!(entry.last_accessed_at >= entry.created_at);
    }

    // Once its TTL has elapsed an entry is never returned, and the read removes it.
    #[test]
    fn prop_expired_never_returned(
        key in valid_key_strategy(),
        value in value_strategy(),
        ttl in 1u64..1_000,
        overshoot_ms in 0u64..10_000
    ) {
        let (mut store, clock) = new_store();

        store.set(key.clone(), value, ttl).unwrap();
        clock.advance(std::time::Duration::from_millis(ttl * 1000 + overshoot_ms));

        prop_assert!(store.get(&key).is_none());
        prop_assert_eq!(store.size(), 0);
    }

    // The store agrees with the model after every operation, and cleanup
    // accounting holds on every pass.
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (mut store, clock) = new_store();
        let mut model: Model = HashMap::new();

        for op in ops {
            let now = clock.now_ms();
            match op {
                CacheOp::Set { key, value, ttl } => {
                    store.set(key.clone(), value.clone(), ttl).unwrap();
                    model.insert(key, (value, now + ttl * 1000, 0));
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key);
                    let live = model.get(&key).map(|(_, expires_at, _)| *expires_at > now);
                    let expected = match live {
                        Some(true) => model.get_mut(&key).map(|(value, _, hits)| {
                            *hits += 1;
                            value.clone()
                        }),
                        Some(false) => {
                            model.remove(&key);
                            None
                        }
                        None => None,
                    };
                    prop_assert_eq!(&got, &expected);
                    if got.is_some() {
                        prop_assert_eq!(store.entry(&key).unwrap().hit_count, model[&key].2);
                    }
                }
                CacheOp::Invalidate { key } => {
                    prop_assert_eq!(store.invalidate(&key), model.remove(&key).is_some());
                }
                CacheOp::Advance { ms } => {
                    clock.advance(std::time::Duration::from_millis(ms));
                }
                CacheOp::Cleanup => {
                    let size_before = store.size();
                    let live_before = store.live_size();
                    let report = store.cleanup();

                    let expired = model.values().filter(|(_, exp, _)| *exp <= now).count();
                    model.retain(|_, (_, exp, _)| *exp > now);

                    prop_assert_eq!(report.removed_count, expired);
                    prop_assert_eq!(report.remaining_count, model.len());
                    prop_assert_eq!(report.removed_count + report.remaining_count, size_before);
                    prop_assert_eq!(store.stats().total_entries, live_before);
                    prop_assert_eq!(store.cleanup().removed_count, 0);
                }
            }
            prop_assert_eq!(store.size(), model.len());
        }

        let now = clock.now_ms();
        let live: Vec<_> = model.values().filter(|(_, exp, _)| *exp > now).collect();
        let stats = store.stats();
        prop_assert_eq!(stats.total_entries, live.len());
        prop_assert_eq!(stats.total_hits, live.iter().map(|(_, _, hits)| *hits).sum::<u64>());
    }

    // Stats is a pure read: calling it never changes what the store holds.
    #[test]
    fn prop_stats_does_not_mutate(
        ops in prop::collection::vec(cache_op_strategy(), 1..40)
    ) {
        let (mut store, clock) = new_store();
        for op in ops {
            match op {
                CacheOp::Set { key, value, ttl } => { let _ = store.set(key, value, ttl); }
                CacheOp::Get { key } => { let _ = store.get(&key); }
                CacheOp::Invalidate { key } => { store.invalidate(&key); }
                CacheOp::Advance { ms } => clock.advance(std::time::Duration::from_millis(ms)),
                CacheOp::Cleanup => { store.cleanup(); }
            }
        }

        let size = store.size();
        let first = store.stats();
        let second = store.stats();
        prop_assert_eq!(first, second);
        prop_assert_eq!(store.size(), size);
    }
}

// == Property Test for Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error turns into a JSON body with an "error" field.
    #[test]
    fn prop_error_response_has_error_field(detail in "[a-zA-Z0-9 ]{1,40}", kind in 0u8..4) {
        use crate::error::CacheError;
        use axum::response::IntoResponse;

        let error = match kind {
            0 => CacheError::Unauthorized,
            1 => CacheError::InvalidArgument(detail),
            2 => CacheError::StorageUnavailable(detail),
            _ => CacheError::Internal(detail),
        };

        let rt = tokio::runtime::Runtime::new().unwrap();
        let body: Value = rt.block_on(async {
            let bytes = axum::body::to_bytes(error.into_response().into_body(), usize::MAX)
                .await
                .unwrap();
            serde_json::from_slice(&bytes).unwrap()
        });

        prop_assert!(body.get("error").and_then(Value::as_str).is_some());
    }
}

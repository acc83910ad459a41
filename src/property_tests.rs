//! Property-based tests for the cache core.
//!
//! Drives random operation sequences against a model map and checks that
//! the tracked byte total always equals the true sum of payload lengths,
//! and that shrink passes respect their byte target.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::{Cache, CacheConfig};

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,3}"
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
    Delete { key: String },
    Shrink { target: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => (0u64..256).prop_map(|target| CacheOp::Shrink { target }),
    ]
}

fn model_bytes(model: &HashMap<String, usize>) -> u64 {
    model.values().map(|len| *len as u64).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // After any operation sequence, the tracked byte total equals the true
    // sum of payload lengths and the entry count matches.
    #[test]
    fn prop_byte_accounting_invariant(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let cache = Cache::new(CacheConfig::default());
        let mut model: HashMap<String, usize> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    model.insert(key.clone(), value.len());
                    cache.set(key, value);
                }
                CacheOp::Get { key } => {
                    let expected = model.contains_key(&key);
                    prop_assert_eq!(cache.get(&key).is_some(), expected);
                }
                CacheOp::Delete { key } => {
                    let expected = model.remove(&key).is_some();
                    prop_assert_eq!(cache.delete(&key), expected);
                }
                CacheOp::Shrink { target } => {
                    cache.shrink_to(target);
                    prop_assert!(cache.bytes_referenced() <= target);
                    // Shrink picks victims by recency; resync the model from
                    // what survived. `contains` doesn't touch recency.
                    model.retain(|key, _| cache.contains(key));
                }
            }

            prop_assert_eq!(cache.bytes_referenced(), model_bytes(&model));
            prop_assert_eq!(cache.len(), model.len());
        }
    }

    // Round trip: a set value comes back unchanged.
    #[test]
    fn prop_roundtrip(key in key_strategy(), value in value_strategy()) {
        let cache = Cache::new(CacheConfig::default());

        cache.set(key.clone(), value.clone());
        let got = cache.get(&key);
        prop_assert_eq!(got.as_deref(), Some(value.as_slice()));
    }

    // Overwriting a key leaves exactly the new value's bytes accounted.
    #[test]
    fn prop_overwrite_accounts_delta(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let cache = Cache::new(CacheConfig::default());

        cache.set(key.clone(), value1);
        cache.set(key.clone(), value2.clone());

        let got = cache.get(&key);
        prop_assert_eq!(got.as_deref(), Some(value2.as_slice()));
        prop_assert_eq!(cache.len(), 1);
        prop_assert_eq!(cache.bytes_referenced(), value2.len() as u64);
    }

    // A shrink pass never leaves the cache over target and never evicts
    // more than necessary: the survivors are the most recently inserted.
    #[test]
    fn prop_shrink_keeps_most_recent(
        sizes in prop::collection::vec(1usize..32, 2..20),
        target in 0u64..256
    ) {
        let cache = Cache::new(CacheConfig::default());

        for (i, size) in sizes.iter().enumerate() {
            cache.set(format!("key_{}", i), vec![0u8; *size]);
        }

        cache.shrink_to(target);
        prop_assert!(cache.bytes_referenced() <= target);

        // Survivors must form a suffix of the insertion order: once a key
        // survives, every more recent key must have survived too.
        let mut seen_survivor = false;
        for i in 0..sizes.len() {
            let alive = cache.contains(&format!("key_{}", i));
            if seen_survivor {
                prop_assert!(alive);
            }
            seen_survivor = seen_survivor || alive;
        }
    }
}

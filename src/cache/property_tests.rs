//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against random operation sequences.

use proptest::prelude::*;

use crate::cache::{Payload, Produced, RingCache};
use crate::config::CacheConfig;

/// Payload that accepts the "reload" hook on every value.
#[derive(Debug, Clone, PartialEq)]
struct Counted {
    value: u32,
    reloads: u32,
}

impl From<u32> for Counted {
    fn from(value: u32) -> Self {
        Counted { value, reloads: 0 }
    }
}

impl Payload for Counted {
    fn supports(&self, operation: &str) -> bool {
        operation == "reload"
    }

    fn invoke(&mut self, _operation: &str) {
        self.reloads += 1;
    }
}

// == Strategies ==
/// Small key space so sequences hit, overwrite and evict often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Write { key: String, value: u32 },
    Read { key: String },
    Fetch { key: String, value: u32, skip: bool },
    Evict { key: String },
    Reset,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Write { key, value }),
        4 => key_strategy().prop_map(|key| CacheOp::Read { key }),
        3 => (key_strategy(), any::<u32>(), any::<bool>())
            .prop_map(|(key, value, skip)| CacheOp::Fetch { key, value, skip }),
        1 => key_strategy().prop_map(|key| CacheOp::Evict { key }),
        1 => Just(CacheOp::Reset),
    ]
}

fn config_strategy() -> impl Strategy<Value = CacheConfig> {
    (
        proptest::option::of(1usize..12),
        proptest::option::of(0.05f64..0.95),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(capacity, target_hit_rate, duplicate_on_store, duplicate_on_retrieve, reload)| {
                CacheConfig {
                    capacity,
                    target_hit_rate,
                    duplicate_on_store,
                    duplicate_on_retrieve,
                    execute_on_retrieve: if reload { vec!["reload".to_string()] } else { Vec::new() },
                }
            },
        )
}

fn apply<V>(cache: &mut RingCache<String, V>, op: CacheOp)
where
    V: Payload + From<u32>,
{
    match op {
        CacheOp::Write { key, value } => {
            cache.write(key, V::from(value));
        }
        CacheOp::Read { key } => {
            cache.read(&key).unwrap();
        }
        CacheOp::Fetch { key, value, skip } => {
            let value = V::from(value);
            cache
                .fetch(key, || if skip { Produced::Skip(value) } else { Produced::Cache(value) })
                .unwrap();
        }
        CacheOp::Evict { key } => {
            cache.evict(&key);
        }
        CacheOp::Reset => cache.reset(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Property: entry map and recency index stay in one-to-one correspondence
    // after every operation, whatever the limits.
    #[test]
    fn prop_index_matches_store(
        config in config_strategy(),
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut cache: RingCache<String, Counted> = RingCache::new(config).unwrap();

        for op in ops {
            apply(&mut cache, op);
            prop_assert!(cache.check_invariants().is_ok(), "{:?}", cache.check_invariants());
            prop_assert_eq!(cache.keys_by_recency().count(), cache.size());
        }
    }

    // Property: the entry count never exceeds the configured capacity.
    #[test]
    fn prop_capacity_enforcement(
        config in config_strategy(),
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let capacity = config.capacity;
        let mut cache: RingCache<String, Counted> = RingCache::new(config).unwrap();

        for op in ops {
            apply(&mut cache, op);
            if let Some(capacity) = capacity {
                prop_assert!(
                    cache.size() <= capacity,
                    "Cache size {} exceeds capacity {}",
                    cache.size(),
                    capacity
                );
            }
        }
    }

    // Property: every lookup is an access, hits are exactly the lookups that
    // found their key, and the hit rate is their ratio.
    #[test]
    fn prop_statistics_accuracy(
        config in config_strategy(),
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut cache: RingCache<String, Counted> = RingCache::new(config).unwrap();
        let mut accesses: u64 = 0;
        let mut hits: u64 = 0;

        for op in ops {
            match &op {
                CacheOp::Read { key } | CacheOp::Fetch { key, .. } => {
                    accesses += 1;
                    if cache.has_key(key) {
                        hits += 1;
                    }
                }
                CacheOp::Reset => {
                    accesses = 0;
                    hits = 0;
                }
                _ => {}
            }
            apply(&mut cache, op);
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.accesses, accesses);
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.misses, accesses - hits);
        let expected_rate = if accesses == 0 { 0.0 } else { hits as f64 / accesses as f64 };
        prop_assert_eq!(cache.hit_rate(), expected_rate);
    }

    // Property: with only a capacity limit, the cache behaves like a
    // reference LRU list (front = oldest).
    #[test]
    fn prop_matches_reference_lru(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut cache: RingCache<String, u32> =
            RingCache::new(CacheConfig::new().with_capacity(capacity)).unwrap();
        let mut model: Vec<String> = Vec::new();

        for op in ops {
            match &op {
                CacheOp::Write { key, .. } | CacheOp::Fetch { key, skip: false, .. } => {
                    if let Some(pos) = model.iter().position(|k| k == key) {
                        model.remove(pos);
                    } else if model.len() >= capacity {
                        model.remove(0);
                    }
                    model.push(key.clone());
                }
                CacheOp::Read { key } | CacheOp::Fetch { key, skip: true, .. } => {
                    if let Some(pos) = model.iter().position(|k| k == key) {
                        let k = model.remove(pos);
                        model.push(k);
                    }
                }
                CacheOp::Evict { key } => model.retain(|k| k != key),
                CacheOp::Reset => model.clear(),
            }
            apply(&mut cache, op);

            let keys: Vec<String> = cache.keys_by_recency().cloned().collect();
            prop_assert_eq!(keys, model.clone());
        }
    }

    // Property: writing the same key repeatedly never grows the cache.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        values in prop::collection::vec(any::<u32>(), 1..10)
    ) {
        let mut cache = RingCache::new(CacheConfig::new().with_capacity(3)).unwrap();
        let last = *values.last().unwrap();

        for value in values {
            prop_assert_eq!(cache.write(key.clone(), value), None);
            prop_assert_eq!(cache.size(), 1);
            prop_assert!(cache.check_invariants().is_ok());
        }

        prop_assert_eq!(cache.read(&key).unwrap(), Some(last));
    }

    // Property: without duplicate-on-retrieve every hit runs the hook on the
    // cached value, with it the cached value never sees the hook.
    #[test]
    fn prop_hooks_follow_duplication(
        key in key_strategy(),
        value in any::<u32>(),
        duplicate_on_retrieve in any::<bool>(),
        reads in 1u32..6
    ) {
        let config = CacheConfig::new()
            .duplicate_on_retrieve(duplicate_on_retrieve)
            .execute_on_retrieve("reload");
        let mut cache: RingCache<String, Counted> = RingCache::new(config).unwrap();
        cache.write(key.clone(), Counted::from(value));

        for read in 1..=reads {
            let data = cache.read_strict(&key).unwrap();
            prop_assert_eq!(data.value, value);
            let expected = if duplicate_on_retrieve { 1 } else { read };
            prop_assert_eq!(data.reloads, expected);
        }
    }

    // Property: a stored value reads back unchanged.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in any::<u32>()) {
        let mut cache: RingCache<String, u32> = RingCache::unbounded();
        cache.write(key.clone(), value);
        prop_assert_eq!(cache.read_strict(&key).unwrap(), value);
    }
}

//! Integration tests for the fixed-arity immutable map family
//!
//! Covers arity/lookup grids, construction-order independence of equality
//! and hashing, select/reject partitioning, the duplicate-key quirks of
//! collect and flip, and the wire format.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::thread;

use cairn_collections::{CollectionError, SmallMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn numbered_pairs(arity: usize) -> Vec<(String, i32)> {
    (0..arity).map(|i| (format!("k{}", i), i as i32)).collect()
}

// ============================================================================
// Construction and Lookup Tests
// ============================================================================

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
fn test_every_arity_reports_size_and_resolves_keys(#[case] arity: usize) {
    let pairs = numbered_pairs(arity);
    let map: SmallMap<String, i32> = SmallMap::try_from_pairs(pairs.clone()).unwrap();
    assert_eq!(map.len(), arity);
    assert_eq!(map.is_empty(), arity == 0);
    for (key, value) in &pairs {
        assert_eq!(map.get(key.as_str()), Some(value));
        assert!(map.contains_key(key.as_str()));
        assert!(map.contains_value(value));
    }
    assert_eq!(map.get("missing"), None);
    assert!(!map.contains_key("missing"));
}

#[test]
fn test_of_full_arity() {
    let map = SmallMap::of([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);
    assert_eq!(map.len(), 4);
    assert_eq!(map.get("d"), Some(&4));
}

#[test]
fn test_try_from_pairs_reports_overflow() {
    let result: Result<SmallMap<i32, i32>, _> =
        SmallMap::try_from_pairs((0..6).map(|i| (i, i * 10)));
    assert_eq!(
        result.unwrap_err(),
        CollectionError::CapacityExceeded {
            requested: 6,
            capacity: 4
        }
    );
}

#[test]
fn test_wider_capacity_accepts_more_entries() {
    let pairs: Vec<(i32, i32)> = (0..7).map(|i| (i, i)).collect();
    let map: SmallMap<i32, i32, 8> = SmallMap::try_from_pairs(pairs).unwrap();
    assert_eq!(map.len(), 7);
    assert_eq!(map.get(&6), Some(&6));
}

// ============================================================================
// View Tests
// ============================================================================

#[test]
fn test_views_follow_construction_order() {
    let map = SmallMap::of([("b", 2), ("a", 1), ("c", 3)]);
    let keys: Vec<_> = map.keys().copied().collect();
    let values: Vec<_> = map.values().copied().collect();
    let pairs: Vec<_> = map.pairs().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(keys, vec!["b", "a", "c"]);
    assert_eq!(values, vec![2, 1, 3]);
    assert_eq!(pairs, vec![("b", 2), ("a", 1), ("c", 3)]);
}

#[test]
fn test_views_are_restartable() {
    let map = SmallMap::of([("a", 1), ("b", 2)]);
    let first: Vec<_> = map.pairs().collect();
    let second: Vec<_> = map.pairs().collect();
    assert_eq!(first, second);
}

#[test]
fn test_for_each_family() {
    let map = SmallMap::of([("a", 1), ("b", 2), ("c", 3)]);

    let mut seen = Vec::new();
    map.for_each_pair(|k, v| seen.push((*k, *v)));
    assert_eq!(seen, vec![("a", 1), ("b", 2), ("c", 3)]);

    let mut keys = String::new();
    map.for_each_key(|k| keys.push_str(k));
    assert_eq!(keys, "abc");

    let mut total = 0;
    map.for_each_value(|v| total += v);
    assert_eq!(total, 6);

    let mut indexed = Vec::new();
    map.for_each_with_index(|v, i| indexed.push((*v, i)));
    assert_eq!(indexed, vec![(1, 0), (2, 1), (3, 2)]);
}

#[test]
fn test_into_iterator_on_reference() {
    let map = SmallMap::of([("a", 1), ("b", 2)]);
    let mut total = 0;
    for (_, value) in &map {
        total += value;
    }
    assert_eq!(total, 3);
}

// ============================================================================
// Equality and Hashing Tests
// ============================================================================

#[test]
fn test_equality_ignores_construction_order() {
    let forward = SmallMap::of([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);
    let backward = SmallMap::of([("d", 4), ("c", 3), ("b", 2), ("a", 1)]);
    assert_eq!(forward, backward);
    assert_eq!(hash_of(&forward), hash_of(&backward));
}

#[test]
fn test_equality_across_capacities() {
    let narrow: SmallMap<&str, i32, 2> = SmallMap::from_pairs([("a", 1), ("b", 2)]);
    let wide: SmallMap<&str, i32, 8> = SmallMap::from_pairs([("b", 2), ("a", 1)]);
    assert!(narrow == wide);
}

#[test]
fn test_inequality_on_differing_associations() {
    let map = SmallMap::of([("a", 1), ("b", 2)]);
    assert_ne!(map, SmallMap::of([("a", 1), ("b", 3)]));
    assert_ne!(map, SmallMap::of([("a", 1)]));
    assert_ne!(map, SmallMap::of([("a", 1), ("z", 2)]));
}

// ============================================================================
// Filtering Tests
// ============================================================================

#[test]
fn test_select_even_values_example() {
    let map = SmallMap::of([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);

    let even = map.select(|_, v| v % 2 == 0);
    assert_eq!(even.len(), 2);
    assert_eq!(even, SmallMap::of([("b", 2), ("d", 4)]));

    let odd = map.reject(|_, v| v % 2 == 0);
    assert_eq!(odd.len(), 2);
    assert_eq!(odd, SmallMap::of([("a", 1), ("c", 3)]));
}

#[test]
fn test_select_keeps_relative_order() {
    let map = SmallMap::of([("d", 4), ("a", 1), ("c", 3), ("b", 2)]);
    let picked = map.select(|_, v| *v >= 3);
    let keys: Vec<_> = picked.keys().copied().collect();
    assert_eq!(keys, vec!["d", "c"]);
}

#[test]
fn test_select_all_and_none() {
    let map = SmallMap::of([("a", 1), ("b", 2)]);
    assert_eq!(map.select(|_, _| true), map);
    assert!(map.select(|_, _| false).is_empty());
    assert_eq!(map.reject(|_, _| true).len(), 0);
}

#[test]
fn test_detect_in_construction_order() {
    let map = SmallMap::of([("a", 1), ("b", 2), ("c", 2)]);
    assert_eq!(map.detect(|_, v| *v == 2), Some((&"b", &2)));
    assert_eq!(map.detect(|k, _| *k == "z"), None);
}

// ============================================================================
// Transformation Tests
// ============================================================================

#[test]
fn test_collect_transforms_every_pair() {
    let map = SmallMap::of([("a", 1), ("b", 2)]);
    let shouted = map.collect(|k, v| (k.to_uppercase(), v * 10));
    assert_eq!(shouted.len(), 2);
    assert_eq!(shouted.get("A"), Some(&10));
    assert_eq!(shouted.get("B"), Some(&20));
}

#[test]
fn test_collect_key_collision_keeps_arity() {
    // Colliding produced keys are kept: the arity stays at the source's
    // even though the effective association set is smaller.
    let map = SmallMap::of([("a", 1), ("b", 2), ("c", 3)]);
    let collided = map.collect(|_, v| ("same", *v));
    assert_eq!(collided.len(), 3);
    assert_eq!(collided.get("same"), Some(&3));
    let values: Vec<_> = collided.values().copied().collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_collect_values_preserves_keys_and_arity() {
    let map = SmallMap::of([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);
    let doubled = map.collect_values(|_, v| v * 2);
    assert_eq!(doubled.len(), 4);
    assert_eq!(doubled.get("c"), Some(&6));
    let keys: Vec<_> = doubled.keys().copied().collect();
    assert_eq!(keys, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_flip_unique_values_round_trips() {
    let map = SmallMap::of([("a", 1), ("b", 2), ("c", 3)]);
    let flipped = map.flip_unique_values();
    assert_eq!(flipped.len(), 3);
    assert_eq!(flipped.get(&2), Some(&"b"));
    assert_eq!(flipped.flip_unique_values(), map);
}

// ============================================================================
// Wire Format Tests
// ============================================================================

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
fn test_serde_round_trip_per_arity(#[case] arity: usize) {
    let map: SmallMap<String, i32> = SmallMap::try_from_pairs(numbered_pairs(arity)).unwrap();
    let encoded = serde_json::to_string(&map).unwrap();
    let decoded: SmallMap<String, i32> = serde_json::from_str(&encoded).unwrap();
    assert_eq!(map, decoded);
}

#[test]
fn test_wire_form_is_flat_pair_sequence() {
    let map = SmallMap::of([("a", 1), ("b", 2)]);
    let encoded = serde_json::to_value(&map).unwrap();
    assert_eq!(encoded, serde_json::json!([["a", 1], ["b", 2]]));
}

#[test]
fn test_wire_data_survives_capacity_growth() {
    let narrow: SmallMap<String, i32, 4> =
        SmallMap::try_from_pairs(numbered_pairs(3)).unwrap();
    let encoded = serde_json::to_string(&narrow).unwrap();
    let wide: SmallMap<String, i32, 8> = serde_json::from_str(&encoded).unwrap();
    assert_eq!(wide.len(), 3);
    assert_eq!(wide.get("k1"), Some(&1));
}

#[test]
fn test_deserialize_rejects_overflow() {
    let encoded = serde_json::json!([["a", 1], ["b", 2], ["c", 3], ["d", 4], ["e", 5]]);
    let decoded: Result<SmallMap<String, i32>, _> = serde_json::from_value(encoded);
    assert!(decoded.is_err());
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_small_map_is_send_and_sync() {
    // Must compile: immutability is the whole concurrency story
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SmallMap<String, i32>>();
}

#[test]
fn test_unsynchronized_reads_from_many_threads() {
    let map = Arc::new(SmallMap::of([("a", 1), ("b", 2), ("c", 3), ("d", 4)]));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                let mut total = 0;
                for _ in 0..1000 {
                    total += map.get("c").copied().unwrap_or(0);
                }
                total
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3000);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn distinct_key_pairs() -> impl Strategy<Value = Vec<(u8, i32)>> {
    proptest::collection::vec((0u8..100, any::<i32>()), 0..=4).prop_map(|mut pairs| {
        pairs.sort_by_key(|(key, _)| *key);
        pairs.dedup_by_key(|(key, _)| *key);
        pairs
    })
}

proptest! {
    #[test]
    fn prop_equality_and_hash_ignore_order(pairs in distinct_key_pairs()) {
        let forward: SmallMap<u8, i32> = SmallMap::try_from_pairs(pairs.clone()).unwrap();
        let mut shuffled = pairs;
        shuffled.reverse();
        let backward: SmallMap<u8, i32> = SmallMap::try_from_pairs(shuffled).unwrap();
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(hash_of(&forward), hash_of(&backward));
    }

    #[test]
    fn prop_select_and_reject_partition_the_entries(
        pairs in distinct_key_pairs(),
        threshold in any::<i32>(),
    ) {
        let map: SmallMap<u8, i32> = SmallMap::try_from_pairs(pairs).unwrap();
        let kept = map.select(|_, v| *v >= threshold);
        let dropped = map.reject(|_, v| *v >= threshold);
        prop_assert_eq!(kept.len() + dropped.len(), map.len());
        for (key, value) in map.pairs() {
            let in_kept = kept.get(key) == Some(value);
            let in_dropped = dropped.get(key) == Some(value);
            prop_assert!(in_kept != in_dropped);
        }
    }

    #[test]
    fn prop_serde_round_trip(pairs in distinct_key_pairs()) {
        let map: SmallMap<u8, i32> = SmallMap::try_from_pairs(pairs).unwrap();
        let encoded = serde_json::to_string(&map).unwrap();
        let decoded: SmallMap<u8, i32> = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(map, decoded);
    }
}

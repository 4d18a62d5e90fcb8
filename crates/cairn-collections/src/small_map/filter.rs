//! Bitmask filtering over small-map slots
//!
//! A retention mask is a `u32` with bit `i` set iff slot `i` survives the
//! predicate. Reconstruction walks the occupied slots once, cloning the
//! retained pairs in their original relative order - O(N) for any
//! capacity, with no per-mask-value dispatch.

use super::SmallMap;

/// Capacity bound imposed by the `u32` mask.
pub(crate) const MAX_MASK_BITS: usize = 32;

/// Evaluate the predicate against every occupied slot.
pub(crate) fn retention_mask<K, V, P, const N: usize>(
    map: &SmallMap<K, V, N>,
    mut predicate: P,
) -> u32
where
    P: FnMut(&K, &V) -> bool,
{
    assert!(
        N <= MAX_MASK_BITS,
        "capacity {} exceeds mask width {}",
        N,
        MAX_MASK_BITS
    );
    let mut mask = 0u32;
    for (index, (key, value)) in map.pairs().enumerate() {
        if predicate(key, value) {
            mask |= 1 << index;
        }
    }
    mask
}

/// Rebuild a map holding exactly the slots whose mask bit is set.
pub(crate) fn apply_mask<K, V, const N: usize>(map: &SmallMap<K, V, N>, mask: u32) -> SmallMap<K, V, N>
where
    K: Clone,
    V: Clone,
{
    let mut out = SmallMap::empty();
    for (index, (key, value)) in map.pairs().enumerate() {
        if mask & (1 << index) != 0 {
            out.push_pair(key.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SmallMap<&'static str, i32> {
        SmallMap::of([("a", 1), ("b", 2), ("c", 3), ("d", 4)])
    }

    #[test]
    fn test_mask_bit_per_slot() {
        let map = sample();
        assert_eq!(retention_mask(&map, |_, v| v % 2 == 0), 0b1010);
        assert_eq!(retention_mask(&map, |_, _| true), 0b1111);
        assert_eq!(retention_mask(&map, |_, _| false), 0);
        assert_eq!(retention_mask(&map, |k, _| *k == "a"), 0b0001);
    }

    #[test]
    fn test_apply_mask_keeps_relative_order() {
        let map = sample();
        let odd = apply_mask(&map, 0b0101);
        let keys: Vec<_> = odd.keys().copied().collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(odd.len(), 2);
    }

    #[test]
    fn test_apply_full_and_empty_masks() {
        let map = sample();
        assert_eq!(apply_mask(&map, 0b1111).len(), 4);
        assert_eq!(apply_mask(&map, 0).len(), 0);
    }
}

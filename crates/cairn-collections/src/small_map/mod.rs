//! Fixed-arity immutable maps
//!
//! A [`SmallMap`] holds at most `N` associations in inline slots - no hash
//! table, no per-entry heap indirection. Lookups are linear scans, which
//! beats hashing for the handful-of-entries maps this type is meant for.
//! Maps are immutable after construction; every transforming operation
//! returns a new map.
//!
//! The number of occupied slots is the map's arity. Keys are NOT
//! deduplicated: constructing with duplicate keys keeps every slot, the
//! map reports the full arity, and lookups resolve to the latest matching
//! slot. Callers wanting strict map semantics supply distinct keys.

mod filter;
mod serialize;

use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Flatten;
use std::slice;

use crate::api::Collection;
use crate::error::CollectionError;

/// Immutable map with inline storage for up to `N` key-value pairs.
///
/// `N` defaults to 4, the family bound the constructors are sized for.
/// Slots are retained in construction order, which is observable through
/// iteration but carries no weight in equality or hashing.
#[derive(Debug, Clone)]
pub struct SmallMap<K, V, const N: usize = 4> {
    slots: [Option<(K, V)>; N],
    len: usize,
}

/// Constructors at the default capacity. Pinning them here lets
/// `SmallMap::of(...)` infer the capacity the way `HashMap::new` infers
/// its hasher; the `*_pairs`/`empty` constructors below take any `N`.
impl<K, V> SmallMap<K, V> {
    /// The empty (arity-0) map.
    pub fn new() -> Self {
        Self::empty()
    }

    /// Build a map from exactly `M` pairs, in order.
    ///
    /// Duplicate keys are accepted without deduplication. Panics if `M`
    /// exceeds the default capacity; use
    /// [`from_pairs`](Self::from_pairs) for other capacities and
    /// [`try_from_pairs`](Self::try_from_pairs) when the pair count is
    /// not known at compile time.
    pub fn of<const M: usize>(pairs: [(K, V); M]) -> Self {
        Self::from_pairs(pairs)
    }
}

impl<K, V, const N: usize> SmallMap<K, V, N> {
    /// Largest arity this capacity supports.
    pub const CAPACITY: usize = N;

    /// The empty map at capacity `N`.
    pub fn empty() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            len: 0,
        }
    }

    /// Build a map from exactly `M` pairs at capacity `N`.
    ///
    /// Panics if `M` exceeds the capacity.
    pub fn from_pairs<const M: usize>(pairs: [(K, V); M]) -> Self {
        assert!(M <= N, "{} pairs exceed fixed capacity {}", M, N);
        let mut map = Self::empty();
        for pair in pairs {
            map.slots[map.len] = Some(pair);
            map.len += 1;
        }
        map
    }

    /// Fallible construction from dynamic data.
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut iter = pairs.into_iter();
        let mut map = Self::empty();
        while let Some(pair) = iter.next() {
            if map.len == N {
                return Err(CollectionError::CapacityExceeded {
                    requested: N + 1 + iter.count(),
                    capacity: N,
                });
            }
            map.slots[map.len] = Some(pair);
            map.len += 1;
        }
        Ok(map)
    }

    /// Append into the next open slot. Callers uphold `len < N`.
    pub(crate) fn push_pair(&mut self, key: K, value: V) {
        debug_assert!(self.len < N);
        self.slots[self.len] = Some((key, value));
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Key-value pairs in construction order.
    ///
    /// Restartable: call again for a fresh pass, no side effects.
    pub fn pairs(&self) -> Pairs<'_, K, V> {
        Pairs {
            inner: self.slots[..self.len].iter().flatten(),
        }
    }

    /// Keys in construction order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.pairs().map(|(key, _)| key)
    }

    /// Values in construction order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.pairs().map(|(_, value)| value)
    }

    pub fn for_each_pair<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.pairs() {
            f(key, value);
        }
    }

    pub fn for_each_key<F>(&self, mut f: F)
    where
        F: FnMut(&K),
    {
        for key in self.keys() {
            f(key);
        }
    }

    pub fn for_each_value<F>(&self, mut f: F)
    where
        F: FnMut(&V),
    {
        for value in self.values() {
            f(value);
        }
    }

    /// Values with their slot index, in construction order.
    pub fn for_each_with_index<F>(&self, mut f: F)
    where
        F: FnMut(&V, usize),
    {
        for (index, value) in self.values().enumerate() {
            f(value, index);
        }
    }

    /// First pair (in construction order) satisfying the predicate.
    pub fn detect<P>(&self, mut predicate: P) -> Option<(&K, &V)>
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.pairs().find(|(key, value)| predicate(key, value))
    }
}

impl<K: Eq, V, const N: usize> SmallMap<K, V, N> {
    /// Value associated with `key`, or `None`.
    ///
    /// Scans slots from last to first, so when keys repeat the later slot
    /// wins. Construction-order views are unaffected.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.pairs()
            .rev()
            .find(|(k, _)| <K as Borrow<Q>>::borrow(k) == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.keys().any(|k| <K as Borrow<Q>>::borrow(k) == key)
    }

    /// Insert-or-replace used by value flipping. Replacement happens in
    /// the slot of the first occurrence.
    pub(crate) fn upsert(&mut self, key: K, value: V) {
        for slot in self.slots[..self.len].iter_mut().flatten() {
            if slot.0 == key {
                slot.1 = value;
                return;
            }
        }
        self.push_pair(key, value);
    }
}

impl<K, V: PartialEq, const N: usize> SmallMap<K, V, N> {
    pub fn contains_value(&self, value: &V) -> bool {
        self.values().any(|v| v == value)
    }
}

impl<K: Clone, V: Clone, const N: usize> SmallMap<K, V, N> {
    /// Entries satisfying the predicate, in their original relative order.
    ///
    /// The result has the same capacity; its arity is the number of
    /// retained entries.
    pub fn select<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&K, &V) -> bool,
    {
        let mask = filter::retention_mask(self, predicate);
        filter::apply_mask(self, mask)
    }

    /// Entries failing the predicate: select with the predicate negated.
    pub fn reject<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.select(move |key, value| !predicate(key, value))
    }

    /// Transform every pair into a new map of the same arity.
    ///
    /// Produced keys are NOT deduplicated: if two pairs map to the same
    /// key the result still holds both slots and reports the full arity,
    /// with lookups resolving to the later one. This mirrors the
    /// construction-time duplicate policy.
    pub fn collect<K2, V2, F>(&self, mut f: F) -> SmallMap<K2, V2, N>
    where
        F: FnMut(&K, &V) -> (K2, V2),
    {
        let mut out = SmallMap::empty();
        for (key, value) in self.pairs() {
            let (key2, value2) = f(key, value);
            out.push_pair(key2, value2);
        }
        out
    }

    /// Transform values, keys unchanged. Arity-preserving by construction.
    pub fn collect_values<R, F>(&self, mut f: F) -> SmallMap<K, R, N>
    where
        F: FnMut(&K, &V) -> R,
    {
        let mut out = SmallMap::empty();
        for (key, value) in self.pairs() {
            out.push_pair(key.clone(), f(key, value));
        }
        out
    }
}

impl<K: Clone, V: Clone + Eq, const N: usize> SmallMap<K, V, N> {
    /// Swap keys and values.
    ///
    /// The caller guarantees value uniqueness; on collision the later
    /// association silently replaces the earlier one and the arity
    /// shrinks. Note the asymmetry with [`collect`](Self::collect), which
    /// keeps colliding keys.
    pub fn flip_unique_values(&self) -> SmallMap<V, K, N> {
        let mut out = SmallMap::empty();
        for (key, value) in self.pairs() {
            out.upsert(value.clone(), key.clone());
        }
        out
    }
}

/// Iterator over occupied slots, yielding `(&K, &V)`.
pub struct Pairs<'a, K, V> {
    inner: Flatten<slice::Iter<'a, Option<(K, V)>>>,
}

impl<'a, K, V> Iterator for Pairs<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Pairs<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, value)| (key, value))
    }
}

impl<'a, K, V, const N: usize> IntoIterator for &'a SmallMap<K, V, N> {
    type Item = (&'a K, &'a V);
    type IntoIter = Pairs<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs()
    }
}

impl<K, V, const N: usize> Default for SmallMap<K, V, N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, V, const N: usize> Collection for SmallMap<K, V, N> {
    fn len(&self) -> usize {
        self.len
    }
}

/// Equality over the association set, construction-order independent and
/// capacity independent: a map built under one capacity equals a map with
/// the same associations built under another.
impl<K: Eq, V: PartialEq, const N: usize, const M: usize> PartialEq<SmallMap<K, V, M>>
    for SmallMap<K, V, N>
{
    fn eq(&self, other: &SmallMap<K, V, M>) -> bool {
        self.len == other.len()
            && self
                .pairs()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Eq, V: Eq, const N: usize> Eq for SmallMap<K, V, N> {}

/// Order-independent hash: the wrapping sum of per-entry contributions,
/// each the XOR of the independently hashed key and value. Consistent with
/// `Eq` for maps with distinct keys.
impl<K: Hash, V: Hash, const N: usize> Hash for SmallMap<K, V, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut sum: u64 = 0;
        for (key, value) in self.pairs() {
            sum = sum.wrapping_add(single_hash(key) ^ single_hash(value));
        }
        state.write_u64(sum);
    }
}

fn single_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl<K: fmt::Display, V: fmt::Display, const N: usize> fmt::Display for SmallMap<K, V, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (key, value)) in self.pairs().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

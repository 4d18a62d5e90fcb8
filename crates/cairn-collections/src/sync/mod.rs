//! Coarse-grained synchronized sequence
//!
//! [`SyncList`] wraps a plain `Vec` behind one shared mutex. Handles are
//! cheap to clone; clones and every derived view alias the same lock, so
//! any two operations in a lock domain are totally ordered. Aggregate
//! scans acquire the lock once for the whole pass - a consistent snapshot
//! is worth more here than throughput. There is no fine-grained or
//! lock-free machinery anywhere in this module.

mod sublist;
mod views;

pub use sublist::SyncSubList;
pub use views::{SyncParallel, SyncReversed, SyncUnmodifiable};

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::api::{Collection, Sequence};
use crate::error::CollectionError;

/// Shared handle to a lock-guarded `Vec`.
///
/// Cloning a handle aliases the same delegate and the same lock; the lock
/// lives as long as the longest-lived holder. Every operation acquires
/// the lock and releases it on all exit paths before returning.
#[derive(Debug)]
pub struct SyncList<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for SyncList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SyncList<T> {
    /// Empty delegate in a fresh lock domain.
    pub fn new() -> Self {
        Self::of(Vec::new())
    }

    /// Wrap an existing delegate directly.
    pub fn of(delegate: Vec<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(delegate)),
        }
    }

    /// Bind to a caller-supplied lock. Every handle built from the same
    /// `Arc` joins one mutual-exclusion domain.
    pub fn from_shared(inner: Arc<Mutex<Vec<T>>>) -> Self {
        Self { inner }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<T>> {
        self.inner.lock().unwrap()
    }

    /// Direct access to the delegate for manual iteration.
    ///
    /// The lock is held until the guard drops; the caller controls the
    /// extent of that critical section. Keep it tight - every other
    /// handle and view in the domain blocks meanwhile.
    pub fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.guard()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn push(&self, element: T) {
        self.guard().push(element);
    }

    pub fn insert(&self, index: usize, element: T) -> Result<(), CollectionError> {
        let mut delegate = self.guard();
        if index > delegate.len() {
            return Err(CollectionError::OutOfBounds {
                index,
                len: delegate.len(),
            });
        }
        delegate.insert(index, element);
        Ok(())
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn set(&self, index: usize, element: T) -> Result<T, CollectionError> {
        let mut delegate = self.guard();
        if index >= delegate.len() {
            return Err(CollectionError::OutOfBounds {
                index,
                len: delegate.len(),
            });
        }
        Ok(std::mem::replace(&mut delegate[index], element))
    }

    pub fn remove_at(&self, index: usize) -> Result<T, CollectionError> {
        let mut delegate = self.guard();
        if index >= delegate.len() {
            return Err(CollectionError::OutOfBounds {
                index,
                len: delegate.len(),
            });
        }
        Ok(delegate.remove(index))
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn retain<P>(&self, predicate: P)
    where
        P: FnMut(&T) -> bool,
    {
        self.guard().retain(predicate);
    }

    pub fn add_all<I>(&self, elements: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.guard().extend(elements);
    }

    /// One acquisition for the whole traversal.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let delegate = self.guard();
        for element in delegate.iter() {
            f(element);
        }
    }

    pub fn detect_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.guard().iter().position(predicate)
    }

    pub fn detect_last_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.guard().iter().rposition(predicate)
    }

    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.guard().iter().any(predicate)
    }

    pub fn all<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.guard().iter().all(predicate)
    }

    pub fn count_where<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        self.guard().iter().filter(|element| predicate(element)).count()
    }

    pub fn sort_by<F>(&self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.guard().sort_by(compare);
    }

    pub fn sort_by_key<G, F>(&self, f: F)
    where
        G: Ord,
        F: FnMut(&T) -> G,
    {
        self.guard().sort_by_key(f);
    }

    /// Reverse the delegate in place.
    pub fn reverse_in_place(&self) {
        self.guard().reverse();
    }

    /// Live window over `from..to` of the delegate, sharing this lock.
    ///
    /// Structural mutation through the window adjusts the window;
    /// structural mutation through the parent does not rebase windows
    /// that already exist (see [`SyncSubList`]).
    pub fn sub_list(&self, from: usize, to: usize) -> Result<SyncSubList<T>, CollectionError> {
        let delegate = self.guard();
        if from > to || to > delegate.len() {
            return Err(CollectionError::InvalidRange {
                from,
                to,
                len: delegate.len(),
            });
        }
        Ok(SyncSubList::new(Arc::clone(&self.inner), from, to - from))
    }

    /// Lazy reversed presentation of the delegate, sharing this lock.
    pub fn as_reversed(&self) -> SyncReversed<T> {
        SyncReversed::new(Arc::clone(&self.inner))
    }

    /// Read-only layer over this lock; reads still serialize with every
    /// writer in the domain.
    pub fn as_unmodifiable(&self) -> SyncUnmodifiable<T> {
        SyncUnmodifiable::new(Arc::clone(&self.inner))
    }

    /// Parallel scan view over this lock. Each operation on it is a
    /// single acquisition fanning out across the rayon pool in batches
    /// of at least `batch_size` elements.
    pub fn as_parallel(&self, batch_size: usize) -> SyncParallel<T> {
        SyncParallel::new(Arc::clone(&self.inner), batch_size)
    }

    /// Identity: this handle is already synchronized. Returns a handle on
    /// the same lock and delegate, never a re-wrap.
    pub fn as_synchronized(&self) -> SyncList<T> {
        self.clone()
    }

    /// Fresh empty list in its own lock domain.
    pub fn new_empty(&self) -> SyncList<T> {
        SyncList::new()
    }

    /// True if both handles belong to one lock domain.
    pub fn shares_lock_with(&self, other: &SyncList<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> SyncList<T> {
    pub fn get(&self, index: usize) -> Option<T> {
        self.guard().get(index).cloned()
    }

    pub fn first(&self) -> Option<T> {
        self.guard().first().cloned()
    }

    pub fn last(&self) -> Option<T> {
        self.guard().last().cloned()
    }

    /// Consistent copy of the delegate, taken under one acquisition.
    pub fn snapshot(&self) -> Vec<T> {
        self.guard().clone()
    }

    pub fn detect<P>(&self, mut predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.guard().iter().find(|element| predicate(element)).cloned()
    }

    pub fn select<P>(&self, mut predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.guard()
            .iter()
            .filter(|element| predicate(element))
            .cloned()
            .collect()
    }

    pub fn reject<P>(&self, mut predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.select(move |element| !predicate(element))
    }

    pub fn partition<P>(&self, mut predicate: P) -> (Vec<T>, Vec<T>)
    where
        P: FnMut(&T) -> bool,
    {
        self.guard()
            .iter()
            .cloned()
            .partition(|element| predicate(element))
    }

    pub fn collect<R, F>(&self, mut f: F) -> Vec<R>
    where
        F: FnMut(&T) -> R,
    {
        self.guard().iter().map(|element| f(element)).collect()
    }

    pub fn group_by<G, F>(&self, mut f: F) -> HashMap<G, Vec<T>>
    where
        G: Hash + Eq,
        F: FnMut(&T) -> G,
    {
        let delegate = self.guard();
        let mut groups: HashMap<G, Vec<T>> = HashMap::new();
        for element in delegate.iter() {
            groups.entry(f(element)).or_default().push(element.clone());
        }
        groups
    }

    pub fn zip<S, I>(&self, other: I) -> Vec<(T, S)>
    where
        I: IntoIterator<Item = S>,
    {
        self.guard().iter().cloned().zip(other).collect()
    }

    pub fn zip_with_index(&self) -> Vec<(T, usize)> {
        self.guard()
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, element)| (element, index))
            .collect()
    }

    /// First occurrence of each element, in order.
    pub fn distinct(&self) -> Vec<T>
    where
        T: PartialEq,
    {
        let delegate = self.guard();
        let mut out: Vec<T> = Vec::new();
        for element in delegate.iter() {
            if !out.contains(element) {
                out.push(element.clone());
            }
        }
        out
    }

    pub fn take(&self, count: usize) -> Vec<T> {
        self.guard().iter().take(count).cloned().collect()
    }

    pub fn drop_first(&self, count: usize) -> Vec<T> {
        self.guard().iter().skip(count).cloned().collect()
    }

    pub fn take_while<P>(&self, mut predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.guard()
            .iter()
            .take_while(|element| predicate(element))
            .cloned()
            .collect()
    }

    pub fn drop_while<P>(&self, mut predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.guard()
            .iter()
            .skip_while(|element| predicate(element))
            .cloned()
            .collect()
    }

    /// Reversed copy; the delegate is untouched.
    pub fn to_reversed(&self) -> Vec<T> {
        self.guard().iter().rev().cloned().collect()
    }
}

impl<T: PartialEq> SyncList<T> {
    pub fn contains(&self, element: &T) -> bool {
        self.guard().contains(element)
    }

    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.guard().iter().position(|e| e == element)
    }

    pub fn last_index_of(&self, element: &T) -> Option<usize> {
        self.guard().iter().rposition(|e| e == element)
    }

    /// Remove the first occurrence. Returns whether anything was removed.
    pub fn remove_item(&self, element: &T) -> bool {
        let mut delegate = self.guard();
        match delegate.iter().position(|e| e == element) {
            Some(index) => {
                delegate.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<T: Ord> SyncList<T> {
    pub fn sort(&self) {
        self.guard().sort();
    }

    /// Delegate must be sorted, as with any binary search.
    pub fn binary_search(&self, element: &T) -> Result<usize, usize> {
        self.guard().binary_search(element)
    }
}

impl<T> Default for SyncList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for SyncList<T> {
    fn from(delegate: Vec<T>) -> Self {
        Self::of(delegate)
    }
}

/// Conformance adapter: foreign sequences convert into the canonical
/// delegate before wrapping.
impl<T> From<VecDeque<T>> for SyncList<T> {
    fn from(delegate: VecDeque<T>) -> Self {
        Self::of(delegate.into_iter().collect())
    }
}

impl<T> FromIterator<T> for SyncList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter.into_iter().collect())
    }
}

impl<T> Extend<T> for SyncList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

/// Equality compares two consistent snapshots, taken one after the other.
/// Never holds both locks at once, so comparing lists from different
/// domains cannot deadlock.
impl<T: Clone + PartialEq> PartialEq for SyncList<T> {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let left = self.snapshot();
        let right = other.snapshot();
        left == right
    }
}

impl<T: fmt::Display> fmt::Display for SyncList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delegate = self.guard();
        write!(f, "[")?;
        for (index, element) in delegate.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", element)?;
        }
        write!(f, "]")
    }
}

impl<T> Collection for SyncList<T> {
    fn len(&self) -> usize {
        self.guard().len()
    }
}

impl<T: Clone> Sequence<T> for SyncList<T> {
    fn get_at(&self, index: usize) -> Option<T> {
        self.get(index)
    }
}

/// Wire form is the delegate alone: a plain sequence. Deserialization
/// rebuilds a fresh wrapper around the decoded delegate.
impl<T: Serialize> Serialize for SyncList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let delegate = self.guard();
        delegate.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SyncList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(SyncList::of)
    }
}

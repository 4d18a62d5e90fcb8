//! Read-only and parallel views sharing the parent's lock
//!
//! Every view here holds a clone of the parent's `Arc`, never a fresh
//! lock: an operation on a view and an operation on the parent are
//! mutually excluded exactly like two operations on the parent.

use std::sync::{Arc, Mutex, MutexGuard};

use rayon::prelude::*;

use crate::api::{Collection, Sequence};

/// Lazy reversed presentation of the parent delegate.
///
/// Nothing is copied up front; each read resolves against the delegate's
/// current state, last element first.
#[derive(Debug)]
pub struct SyncReversed<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for SyncReversed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SyncReversed<T> {
    pub(crate) fn new(inner: Arc<Mutex<Vec<T>>>) -> Self {
        Self { inner }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<T>> {
        self.inner.lock().unwrap()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let delegate = self.guard();
        for element in delegate.iter().rev() {
            f(element);
        }
    }
}

impl<T: Clone> SyncReversed<T> {
    pub fn get(&self, index: usize) -> Option<T> {
        let delegate = self.guard();
        let len = delegate.len();
        if index >= len {
            return None;
        }
        delegate.get(len - 1 - index).cloned()
    }

    pub fn first(&self) -> Option<T> {
        self.guard().last().cloned()
    }

    pub fn last(&self) -> Option<T> {
        self.guard().first().cloned()
    }

    /// Reversed copy of the delegate under one acquisition.
    pub fn snapshot(&self) -> Vec<T> {
        self.guard().iter().rev().cloned().collect()
    }
}

impl<T> Collection for SyncReversed<T> {
    fn len(&self) -> usize {
        self.guard().len()
    }
}

impl<T: Clone> Sequence<T> for SyncReversed<T> {
    fn get_at(&self, index: usize) -> Option<T> {
        self.get(index)
    }
}

/// Read-only layer over the shared lock.
///
/// Exposes no mutators; handles and views elsewhere in the domain keep
/// their write access, and reads here still serialize with them.
#[derive(Debug)]
pub struct SyncUnmodifiable<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for SyncUnmodifiable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SyncUnmodifiable<T> {
    pub(crate) fn new(inner: Arc<Mutex<Vec<T>>>) -> Self {
        Self { inner }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<T>> {
        self.inner.lock().unwrap()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let delegate = self.guard();
        for element in delegate.iter() {
            f(element);
        }
    }

    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.guard().iter().any(predicate)
    }
}

impl<T: Clone> SyncUnmodifiable<T> {
    pub fn get(&self, index: usize) -> Option<T> {
        self.guard().get(index).cloned()
    }

    pub fn first(&self) -> Option<T> {
        self.guard().first().cloned()
    }

    pub fn last(&self) -> Option<T> {
        self.guard().last().cloned()
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.guard().clone()
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

    pub fn collect<R, F>(&self, mut f: F) -> Vec<R>
    where
        F: FnMut(&T) -> R,
    {
        self.guard().iter().map(|element| f(element)).collect()
    }
}

impl<T: PartialEq> SyncUnmodifiable<T> {
    pub fn contains(&self, element: &T) -> bool {
        self.guard().contains(element)
    }

    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.guard().iter().position(|e| e == element)
    }
}

impl<T> Collection for SyncUnmodifiable<T> {
    fn len(&self) -> usize {
        self.guard().len()
    }
}

impl<T: Clone> Sequence<T> for SyncUnmodifiable<T> {
    fn get_at(&self, index: usize) -> Option<T> {
        self.get(index)
    }
}

/// Parallel scan view.
///
/// Each operation acquires the lock once, then fans the scan out across
/// the rayon pool in batches of at least `batch_size` elements. The lock
/// is held for the whole scan: concurrent mutators in the domain wait,
/// and the scan sees one consistent delegate state.
#[derive(Debug)]
pub struct SyncParallel<T> {
    inner: Arc<Mutex<Vec<T>>>,
    batch_size: usize,
}

impl<T> Clone for SyncParallel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            batch_size: self.batch_size,
        }
    }
}

impl<T> SyncParallel<T> {
    pub(crate) fn new(inner: Arc<Mutex<Vec<T>>>, batch_size: usize) -> Self {
        Self {
            inner,
            // A zero batch would panic inside rayon
            batch_size: batch_size.max(1),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<T>> {
        self.inner.lock().unwrap()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<T: Send + Sync> SyncParallel<T> {
    pub fn for_each<F>(&self, f: F)
    where
        F: Fn(&T) + Send + Sync,
    {
        let delegate = self.guard();
        delegate
            .par_iter()
            .with_min_len(self.batch_size)
            .for_each(|element| f(element));
    }

    pub fn count_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        let delegate = self.guard();
        delegate
            .par_iter()
            .with_min_len(self.batch_size)
            .filter(|element| predicate(element))
            .count()
    }
}

impl<T: Clone + Send + Sync> SyncParallel<T> {
    /// Retained elements in their original order.
    pub fn select<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        let delegate = self.guard();
        delegate
            .par_iter()
            .with_min_len(self.batch_size)
            .filter(|element| predicate(element))
            .cloned()
            .collect()
    }

    /// Transformed elements in their original order.
    pub fn collect<R, F>(&self, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        let delegate = self.guard();
        delegate
            .par_iter()
            .with_min_len(self.batch_size)
            .map(|element| f(element))
            .collect()
    }
}

impl<T> Collection for SyncParallel<T> {
    fn len(&self) -> usize {
        self.guard().len()
    }
}

//! Live sublist window over a synchronized list

use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{Collection, Sequence};
use crate::error::CollectionError;

/// Window `(start, len)` over the parent delegate, guarded by the
/// parent's own lock.
///
/// Structural mutation through the window adjusts the window extent;
/// those methods take `&mut self`. Structural mutation through the parent
/// does NOT rebase windows that already exist - a stale window may then
/// present shifted elements, and reads past the delegate end degrade to
/// `None` or an error rather than tearing. Holding the raw delegate
/// subrange outside the decorator carries the same hazard in any
/// synchronized-wrapper design; it is documented, not remedied, here.
#[derive(Debug)]
pub struct SyncSubList<T> {
    inner: Arc<Mutex<Vec<T>>>,
    start: usize,
    len: usize,
}

impl<T> Clone for SyncSubList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            start: self.start,
            len: self.len,
        }
    }
}

impl<T> SyncSubList<T> {
    pub(crate) fn new(inner: Arc<Mutex<Vec<T>>>, start: usize, len: usize) -> Self {
        Self { inner, start, len }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<T>> {
        self.inner.lock().unwrap()
    }

    /// The part of the window still backed by the delegate.
    fn window<'g>(&self, delegate: &'g [T]) -> &'g [T] {
        let lo = self.start.min(delegate.len());
        let hi = (self.start + self.len).min(delegate.len());
        &delegate[lo..hi]
    }

    /// Window extent. May exceed what the delegate still backs if the
    /// parent shrank underneath this window.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append at the window end, shifting the parent's tail right.
    pub fn push(&mut self, element: T) -> Result<(), CollectionError> {
        let mut delegate = self.guard();
        let at = self.start + self.len;
        if at > delegate.len() {
            return Err(CollectionError::OutOfBounds {
                index: at,
                len: delegate.len(),
            });
        }
        delegate.insert(at, element);
        drop(delegate);
        self.len += 1;
        Ok(())
    }

    pub fn insert(&mut self, index: usize, element: T) -> Result<(), CollectionError> {
        let mut delegate = self.guard();
        if index > self.len || self.start + index > delegate.len() {
            return Err(CollectionError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        delegate.insert(self.start + index, element);
        drop(delegate);
        self.len += 1;
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, CollectionError> {
        let mut delegate = self.guard();
        if index >= self.len || self.start + index >= delegate.len() {
            return Err(CollectionError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        let element = delegate.remove(self.start + index);
        drop(delegate);
        self.len -= 1;
        Ok(element)
    }

    /// Replace the element at window position `index`, returning the
    /// previous one. Visible through the parent immediately.
    pub fn set(&self, index: usize, element: T) -> Result<T, CollectionError> {
        let mut delegate = self.guard();
        if index >= self.len || self.start + index >= delegate.len() {
            return Err(CollectionError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(std::mem::replace(&mut delegate[self.start + index], element))
    }

    /// Nested window, relative to this one; shares the same lock.
    pub fn sub_list(&self, from: usize, to: usize) -> Result<SyncSubList<T>, CollectionError> {
        if from > to || to > self.len {
            return Err(CollectionError::InvalidRange {
                from,
                to,
                len: self.len,
            });
        }
        Ok(SyncSubList::new(
            Arc::clone(&self.inner),
            self.start + from,
            to - from,
        ))
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let delegate = self.guard();
        for element in self.window(&delegate) {
            f(element);
        }
    }

    pub fn detect_index<P>(&self, mut predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        let delegate = self.guard();
        self.window(&delegate).iter().position(|e| predicate(e))
    }

    pub fn any<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        let delegate = self.guard();
        self.window(&delegate).iter().any(|e| predicate(e))
    }
}

impl<T: Clone> SyncSubList<T> {
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        self.guard().get(self.start + index).cloned()
    }

    pub fn first(&self) -> Option<T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<T> {
        match self.len {
            0 => None,
            len => self.get(len - 1),
        }
    }

    /// Consistent copy of the backed window.
    pub fn snapshot(&self) -> Vec<T> {
        let delegate = self.guard();
        self.window(&delegate).to_vec()
    }

    pub fn select<P>(&self, mut predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        let delegate = self.guard();
        self.window(&delegate)
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    pub fn collect<R, F>(&self, mut f: F) -> Vec<R>
    where
        F: FnMut(&T) -> R,
    {
        let delegate = self.guard();
        self.window(&delegate).iter().map(|e| f(e)).collect()
    }
}

impl<T: PartialEq> SyncSubList<T> {
    pub fn contains(&self, element: &T) -> bool {
        let delegate = self.guard();
        self.window(&delegate).contains(element)
    }

    pub fn index_of(&self, element: &T) -> Option<usize> {
        let delegate = self.guard();
        self.window(&delegate).iter().position(|e| e == element)
    }
}

impl<T> Collection for SyncSubList<T> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<T: Clone> Sequence<T> for SyncSubList<T> {
    fn get_at(&self, index: usize) -> Option<T> {
        self.get(index)
    }
}

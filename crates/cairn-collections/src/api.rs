//! Narrow capability traits shared by the collection types
//!
//! Each type opts into exactly the capabilities its representation can
//! honor, instead of one wide interface. The rest of the capability
//! surface rides on std traits (`IntoIterator`, `Extend`, `Display`).

/// Sized collection: element count and emptiness.
pub trait Collection {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Positional reads over an ordered collection.
///
/// Lock-guarded sequences cannot hand out references into their delegate,
/// so positional reads return owned clones.
pub trait Sequence<T: Clone>: Collection {
    fn get_at(&self, index: usize) -> Option<T>;

    fn first_element(&self) -> Option<T> {
        self.get_at(0)
    }

    fn last_element(&self) -> Option<T> {
        match self.len() {
            0 => None,
            len => self.get_at(len - 1),
        }
    }
}

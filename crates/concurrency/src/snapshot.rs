//! Point-in-time enumeration
//!
//! A [`Snapshot`] owns a copy of the list taken while the gate was held. The
//! gate is released before the snapshot is handed out, so external iteration
//! can never keep it locked, whether the loop finishes, breaks early or leaks
//! the iterator.
//!
//! The trade-off is visibility: mutations made after the copy are not seen.

use std::iter::FusedIterator;
use std::vec;

/// Finite, non-restartable iterator over a copy of the list
#[derive(Debug)]
pub struct Snapshot<T> {
    items: vec::IntoIter<T>,
}

impl<T> Snapshot<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Snapshot {
            items: items.into_iter(),
        }
    }

    /// Items not yet yielded
    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }
}

impl<T> Iterator for Snapshot<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> DoubleEndedIterator for Snapshot<T> {
    fn next_back(&mut self) -> Option<T> {
        self.items.next_back()
    }
}

impl<T> ExactSizeIterator for Snapshot<T> {}

impl<T> FusedIterator for Snapshot<T> {}

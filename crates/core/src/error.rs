//! Error types for list operations
//!
//! Only failures detectable synchronously are represented here. Failures raised
//! by traversal callbacks or deferred actions are never returned as a
//! [`ListError`] from the traversal call itself; they are collected into a
//! [`TraversalReport`](crate::TraversalReport) instead.

use thiserror::Error;

/// All errors a list operation can return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// A guarded member was called from inside a callback that already runs
    /// under the gate on the same thread.
    #[error(
        "cannot access list members from within a for_indices, for_each or predicate callback"
    )]
    Reentrancy,

    /// A deferred action was queued from outside a traversal callback.
    #[error("deferred actions can only be queued from inside a for_indices or for_each callback")]
    NotInTraversal,

    /// Index outside `0..len` (or `0..=len` for insertion)
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Length of the list when the gate was held
        len: usize,
    },

    /// Range not contained in `0..len`
    #[error("range {start}..{end} out of bounds for list of length {len}")]
    RangeOutOfBounds {
        /// Inclusive start of the requested range
        start: usize,
        /// Exclusive end of the requested range
        end: usize,
        /// Length of the list when the gate was held
        len: usize,
    },

    /// `copy_to` destination cannot hold the list at the given offset
    #[error("destination of length {available} cannot hold {needed} items at offset {offset}")]
    DestinationTooSmall {
        /// Offset into the destination
        offset: usize,
        /// Number of items to copy
        needed: usize,
        /// Length of the destination slice
        available: usize,
    },

    /// A callback or deferred action panicked and the panic was caught.
    #[error("callback panicked: {0}")]
    CallbackPanicked(String),
}

/// Result type for list operations.
pub type Result<T> = std::result::Result<T, ListError>;

impl ListError {
    /// Check if this is a reentrancy violation.
    pub fn is_reentrancy(&self) -> bool {
        matches!(self, ListError::Reentrancy)
    }

    /// Check if a deferred action was queued outside a traversal.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ListError::NotInTraversal)
    }

    /// Check if this is an index, range or destination bounds error.
    ///
    /// These are the backing store's natural errors; the list is left unchanged.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            ListError::IndexOutOfRange { .. }
                | ListError::RangeOutOfBounds { .. }
                | ListError::DestinationTooSmall { .. }
        )
    }
}

//! Traversal outcome types
//!
//! A bulk traversal never aborts on a failing callback. Every failure is
//! captured with its origin and returned in a [`TraversalReport`]:
//!
//! ```text
//! [ element failures, by index ] ++ [ deferred-action failures, by enqueue order ]
//! ```
//!
//! An empty report means every callback and every deferred action succeeded.

use std::fmt;

/// Where a traversal failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureOrigin {
    /// The callback failed for the element (or index) at `index`
    Element {
        /// Position in the list during the traversal
        index: usize,
    },
    /// A deferred action failed
    Deferred {
        /// Zero-based enqueue position within this traversal
        position: usize,
    },
}

impl fmt::Display for FailureOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureOrigin::Element { index } => write!(f, "element {}", index),
            FailureOrigin::Deferred { position } => write!(f, "deferred action {}", position),
        }
    }
}

/// One failure captured during a traversal
#[derive(Debug)]
pub struct TraversalFailure {
    /// Origin of the failure
    pub origin: FailureOrigin,
    /// The error returned (or panic caught) at that origin
    pub error: anyhow::Error,
}

impl TraversalFailure {
    /// Failure of the callback for the element at `index`
    pub fn element(index: usize, error: anyhow::Error) -> Self {
        TraversalFailure {
            origin: FailureOrigin::Element { index },
            error,
        }
    }

    /// Failure of the deferred action queued at `position`
    pub fn deferred(position: usize, error: anyhow::Error) -> Self {
        TraversalFailure {
            origin: FailureOrigin::Deferred { position },
            error,
        }
    }

    /// True if the failure came from the callback pass
    pub fn is_element(&self) -> bool {
        matches!(self.origin, FailureOrigin::Element { .. })
    }
}

impl fmt::Display for TraversalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.origin, self.error)
    }
}

/// Aggregated outcome of one `for_indices` / `for_each` call
///
/// Created fresh per call; the list keeps no reference to it.
#[derive(Debug, Default)]
pub struct TraversalReport {
    visited: usize,
    deferred_executed: usize,
    failures: Vec<TraversalFailure>,
}

impl TraversalReport {
    /// Build a report
    ///
    /// `failures` must already be ordered: element failures by index, then
    /// deferred failures by enqueue position.
    pub fn new(visited: usize, deferred_executed: usize, failures: Vec<TraversalFailure>) -> Self {
        debug_assert!(
            failures
                .windows(2)
                .all(|pair| !(!pair[0].is_element() && pair[1].is_element())),
            "element failures must precede deferred failures"
        );
        TraversalReport {
            visited,
            deferred_executed,
            failures,
        }
    }

    /// Number of callback invocations made
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Number of deferred actions executed after the pass
    pub fn deferred_executed(&self) -> usize {
        self.deferred_executed
    }

    /// True when no callback and no deferred action failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// All failures, in report order
    pub fn failures(&self) -> &[TraversalFailure] {
        &self.failures
    }

    /// Failures raised by the callback pass
    pub fn element_failures(&self) -> impl Iterator<Item = &TraversalFailure> {
        self.failures.iter().filter(|f| f.is_element())
    }

    /// Failures raised by deferred actions
    pub fn deferred_failures(&self) -> impl Iterator<Item = &TraversalFailure> {
        self.failures.iter().filter(|f| !f.is_element())
    }

    /// Consume the report, keeping only the failures
    pub fn into_failures(self) -> Vec<TraversalFailure> {
        self.failures
    }

    /// Convert into a `Result`, surfacing the first failure
    ///
    /// The returned error carries the first failure's error with the origin and
    /// the total failure count attached as context.
    pub fn into_result(self) -> anyhow::Result<()> {
        let total = self.failures.len();
        match self.failures.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(first.error.context(format!(
                "traversal failed at {} ({} failure(s) in total)",
                first.origin, total
            ))),
        }
    }
}

impl IntoIterator for TraversalReport {
    type Item = TraversalFailure;
    type IntoIter = std::vec::IntoIter<TraversalFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

impl<'a> IntoIterator for &'a TraversalReport {
    type Item = &'a TraversalFailure;
    type IntoIter = std::slice::Iter<'a, TraversalFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

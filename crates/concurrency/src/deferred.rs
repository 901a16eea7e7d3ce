//! Deferred-action queue
//!
//! Traversal callbacks cannot touch the list directly: their thread already
//! holds the gate. Instead they queue actions here. The traversal drains the
//! queue in FIFO order after the callback pass, while still holding the gate,
//! so the whole traversal stays atomic to outside observers.
//!
//! The queue sits outside the gate, behind its own short-lived lock, because
//! callbacks enqueue while the gate is already held by their own traversal.

use crate::traversal::invoke;
use conlist_core::TraversalFailure;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;

type Detached = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;
type WithItems<T> = Box<dyn FnOnce(&mut Vec<T>) -> anyhow::Result<()> + Send>;

/// A queued action
pub enum DeferredAction<T> {
    /// Zero-argument action
    Detached(Detached),
    /// Action that receives the backing store
    WithItems(WithItems<T>),
}

impl<T> DeferredAction<T> {
    fn run(self, items: &mut Vec<T>) -> anyhow::Result<()> {
        match self {
            DeferredAction::Detached(action) => action(),
            DeferredAction::WithItems(action) => action(items),
        }
    }
}

impl<T> fmt::Debug for DeferredAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferredAction::Detached(_) => f.write_str("Detached(..)"),
            DeferredAction::WithItems(_) => f.write_str("WithItems(..)"),
        }
    }
}

/// FIFO of actions waiting for the end of the current callback pass
pub struct DeferredQueue<T> {
    actions: Mutex<VecDeque<DeferredAction<T>>>,
}

impl<T> DeferredQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        DeferredQueue {
            actions: Mutex::new(VecDeque::new()),
        }
    }

    /// Append an action
    ///
    /// Callers are responsible for checking that the calling thread is inside
    /// a traversal's callback pass.
    pub fn push(&self, action: DeferredAction<T>) {
        self.actions.lock().push_back(action);
    }

    /// Number of queued actions
    pub fn len(&self) -> usize {
        self.actions.lock().len()
    }

    /// True if nothing is queued
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.actions.lock().is_empty()
    }

    /// Run every queued action in enqueue order
    ///
    /// Failures are appended to `failures` tagged with their enqueue position;
    /// a failing action never stops the ones after it. Returns the number of
    /// actions executed.
    pub fn drain(
        &self,
        items: &mut Vec<T>,
        failures: &mut Vec<TraversalFailure>,
        catch_panics: bool,
    ) -> usize {
        let mut position = 0;
        // Pop one at a time so the queue lock is never held while user code runs.
        while let Some(action) = self.pop() {
            if let Err(error) = invoke(catch_panics, || action.run(items)) {
                failures.push(TraversalFailure::deferred(position, error));
            }
            position += 1;
        }
        position
    }

    /// Drop every queued action without running it; returns how many were dropped
    pub fn discard(&self) -> usize {
        let mut actions = self.actions.lock();
        let dropped = actions.len();
        actions.clear();
        dropped
    }

    fn pop(&self) -> Option<DeferredAction<T>> {
        self.actions.lock().pop_front()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for DeferredQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredQueue")
            .field("len", &self.len())
            .finish()
    }
}

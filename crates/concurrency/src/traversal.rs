//! Bulk traversal engine
//!
//! Runs the body of `for_indices` / `for_each` once the gate is held:
//!
//! ```text
//! 1. mark calling thread as Visiting
//! 2. invoke callback for every index in 0..len (len fixed at step 1)
//!    - Err or caught panic -> TraversalFailure::element, continue
//! 3. switch mark to Draining
//! 4. drain deferred queue in FIFO order
//!    - Err or caught panic -> TraversalFailure::deferred, continue
//! 5. unmark (scope drop)
//! ```
//!
//! The fail-fast reentrancy check and the gate itself are the caller's job;
//! this module only sees the already-locked backing store.
//!
//! If a panic escapes (panic catching disabled), the scope still unmarks the
//! thread and throws away queued actions, and the caller's gate guard releases
//! the gate during unwinding.

use crate::deferred::DeferredQueue;
use crate::registry::{LoopMark, LoopPhase, LoopRegistry};
use conlist_core::{ListError, ListOptions, TraversalFailure, TraversalReport};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Invoke one callback, turning a panic into an error when requested
pub(crate) fn invoke<F>(catch_panics: bool, call: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    if !catch_panics {
        return call();
    }
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(ListError::CallbackPanicked(panic_message(payload.as_ref())).into()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Marks the thread for the duration of one traversal
struct TraversalScope<'a, T> {
    mark: LoopMark<'a>,
    deferred: &'a DeferredQueue<T>,
    label: &'a str,
}

impl<T> Drop for TraversalScope<'_, T> {
    fn drop(&mut self) {
        // Only non-empty when a panic escaped the pass or the drain.
        let dropped = self.deferred.discard();
        if dropped > 0 {
            warn!(
                list = self.label,
                dropped, "traversal unwound, discarding queued deferred actions"
            );
        }
    }
}

/// Borrowed view of the list's traversal machinery
pub(crate) struct Traversal<'a, T> {
    pub(crate) registry: &'a LoopRegistry,
    pub(crate) deferred: &'a DeferredQueue<T>,
    pub(crate) options: &'a ListOptions,
}

impl<'a, T> Traversal<'a, T> {
    /// Run `visit` for every index, then drain deferred actions
    ///
    /// `items` must be the gate-protected backing store, borrowed through a
    /// live guard.
    pub(crate) fn run<F>(&self, items: &mut Vec<T>, mut visit: F) -> TraversalReport
    where
        F: FnMut(&[T], usize) -> anyhow::Result<()>,
    {
        let label: &str = &self.options.label;
        let catch_panics = self.options.catch_panics;
        let len = items.len();
        debug!(list = label, len, "traversal started");

        let scope = TraversalScope {
            mark: self.registry.enter(LoopPhase::Visiting),
            deferred: self.deferred,
            label,
        };

        let mut failures = Vec::new();
        for index in 0..len {
            let current = items.as_slice();
            if let Err(error) = invoke(catch_panics, || visit(current, index)) {
                failures.push(TraversalFailure::element(index, error));
            }
        }
        let element_failures = failures.len();

        scope.mark.set_phase(LoopPhase::Draining);
        let deferred_executed = self.deferred.drain(items, &mut failures, catch_panics);
        drop(scope);

        if failures.is_empty() {
            debug!(
                list = label,
                visited = len,
                deferred = deferred_executed,
                "traversal finished"
            );
        } else {
            warn!(
                list = label,
                visited = len,
                deferred = deferred_executed,
                element_failures,
                deferred_failures = failures.len() - element_failures,
                "traversal finished with failures"
            );
        }

        TraversalReport::new(len, deferred_executed, failures)
    }
}

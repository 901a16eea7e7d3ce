//! Reentrancy registry
//!
//! Tracks which threads are currently running user code while holding a
//! list's gate. It is read *before* acquiring the gate, so a callback that
//! calls back into the same list fails fast instead of parking forever on a
//! gate its own thread holds.
//!
//! # Identity
//!
//! Contexts are keyed by [`ThreadId`]. Callbacks are synchronous closures, so
//! even inside an async traversal the callback phase never crosses an await
//! point and stays on one thread from mark to unmark.

use dashmap::DashMap;
use std::thread::{self, ThreadId};

/// What the marked thread is doing under the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Invoking a traversal callback once per element or index
    Visiting,
    /// Running deferred actions after the callback pass
    Draining,
    /// Running a pass-through operation, which may call user code
    /// (predicates, caller iterators, `Clone`, `PartialEq`, `Drop`)
    Inspecting,
}

/// Concurrent thread -> phase map
#[derive(Debug, Default)]
pub struct LoopRegistry {
    contexts: DashMap<ThreadId, LoopPhase>,
}

impl LoopRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase of the calling thread, if it is marked
    pub fn phase(&self) -> Option<LoopPhase> {
        self.contexts
            .get(&thread::current().id())
            .map(|entry| *entry.value())
    }

    /// True if the calling thread is running user code under the gate
    pub fn is_current_in_loop(&self) -> bool {
        self.contexts.contains_key(&thread::current().id())
    }

    /// True if the calling thread is inside a traversal's callback pass
    pub fn is_current_visiting(&self) -> bool {
        self.phase() == Some(LoopPhase::Visiting)
    }

    /// Mark the calling thread until the returned mark is dropped
    pub fn enter(&self, phase: LoopPhase) -> LoopMark<'_> {
        let thread = thread::current().id();
        self.contexts.insert(thread, phase);
        LoopMark {
            registry: self,
            thread,
        }
    }

    /// Number of marked threads
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// True when no thread is marked
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

/// RAII mark for one thread; unmarks on drop, unwinding included
#[derive(Debug)]
pub struct LoopMark<'a> {
    registry: &'a LoopRegistry,
    thread: ThreadId,
}

impl LoopMark<'_> {
    /// Move the marked thread to another phase
    pub fn set_phase(&self, phase: LoopPhase) {
        self.registry.contexts.insert(self.thread, phase);
    }
}

impl Drop for LoopMark<'_> {
    fn drop(&mut self) {
        self.registry.contexts.remove(&self.thread);
    }
}

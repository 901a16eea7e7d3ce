//! Concurrency layer for conlist
//!
//! This crate implements the lock-based list and its access protocol:
//! - Gate: binary permit with blocking and async acquisition
//! - LoopRegistry: per-thread reentrancy marks, checked before the gate
//! - Traversal engine: callback passes under one gate hold, failures aggregated
//! - DeferredQueue: work queued by callbacks, drained before the gate is released
//! - Snapshot: point-in-time enumeration that never keeps the gate

#![warn(missing_docs)]
#![warn(clippy::all)]

mod deferred;
mod gate;
pub mod list;
mod registry;
pub mod snapshot;
mod traversal;

pub use list::ConcurrentList;
pub use snapshot::Snapshot;

// Re-export the shared vocabulary for convenience
pub use conlist_core::{
    FailureOrigin, ListError, ListOptions, Result, TraversalFailure, TraversalReport,
};

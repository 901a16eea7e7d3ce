//! # conlist
//!
//! A lock-based, thread-safe ordered list.
//!
//! Every member takes one exclusive gate for exactly one operation. Bulk
//! traversals (`for_indices`, `for_each`) hold the gate for their whole pass,
//! reject reentrant calls from their own callbacks instead of deadlocking,
//! collect callback failures instead of aborting, and run actions queued by
//! those callbacks before letting go of the gate.
//!
//! ## Quick Start
//!
//! ```
//! use conlist::prelude::*;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let list = Arc::new(ConcurrentList::new());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let list = Arc::clone(&list);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 list.push(t * 100 + i).unwrap();
//!             }
//!         })
//!     })
//!     .collect();
//! for h in handles {
//!     h.join().unwrap();
//! }
//! assert_eq!(list.len().unwrap(), 400);
//!
//! // Callbacks may fail; the traversal keeps going and reports every failure.
//! let report = list
//!     .for_each(|item| {
//!         if item % 100 == 0 {
//!             bail!("round number {}", item);
//!         }
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(report.failures().len(), 4);
//!
//! // Enumeration works on a point-in-time copy.
//! let evens = list.snapshot().unwrap().filter(|i| i % 2 == 0).count();
//! assert_eq!(evens, 200);
//! ```
//!
//! ## Layers
//!
//! - [`conlist_core`]: errors, traversal reports, options
//! - [`conlist_concurrency`]: gate, reentrancy registry, deferred queue,
//!   traversal engine, [`ConcurrentList`]

#![warn(missing_docs)]

pub mod prelude;

pub use conlist_concurrency::{ConcurrentList, Snapshot};
pub use conlist_core::{
    FailureOrigin, ListError, ListOptions, Result, TraversalFailure, TraversalReport,
};

/// Result type returned by traversal callbacks and deferred actions
pub type CallbackResult = anyhow::Result<()>;

//! Convenient imports for conlist.
//!
//! ```
//! use conlist::prelude::*;
//!
//! let list = ConcurrentList::from_vec(vec![1, 2, 3]);
//! let report = list.for_each(|_| Ok(())).unwrap();
//! assert!(report.is_clean());
//! ```

// Main entry point
pub use crate::ConcurrentList;

// Error handling
pub use crate::{CallbackResult, ListError, Result};

// Traversal outcome
pub use crate::{FailureOrigin, TraversalFailure, TraversalReport};

// Configuration
pub use crate::ListOptions;

// Callback helpers
pub use anyhow::{anyhow, bail};

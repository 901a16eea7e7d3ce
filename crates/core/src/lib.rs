//! Core types for conlist
//!
//! This crate defines the vocabulary shared by every layer:
//! - [`ListError`] / [`Result`]: synchronous errors raised by list operations
//! - [`TraversalReport`]: aggregated outcome of a bulk traversal
//! - [`ListOptions`]: per-instance configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod options;
pub mod report;

pub use error::{ListError, Result};
pub use options::ListOptions;
pub use report::{FailureOrigin, TraversalFailure, TraversalReport};

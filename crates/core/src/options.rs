//! Per-instance list configuration
//!
//! There are no timeout, fairness or capacity knobs. Options only
//! control how traversals treat panicking callbacks and how the list labels
//! itself in log events.

use std::borrow::Cow;

/// Options for a `ConcurrentList`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Name attached to every log event emitted by the list
    pub label: Cow<'static, str>,
    /// Whether a panicking callback or deferred action is captured as a
    /// traversal failure instead of unwinding out of the traversal call
    pub catch_panics: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            label: Cow::Borrowed("conlist"),
            catch_panics: true,
        }
    }
}

impl ListOptions {
    /// Strict options - panics in callbacks propagate to the traversal caller
    ///
    /// The gate is still released and pending deferred actions are discarded
    /// while unwinding.
    pub fn strict() -> Self {
        ListOptions {
            catch_panics: false,
            ..Default::default()
        }
    }

    /// Set the log label
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Set whether panics are captured into the traversal report
    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }
}

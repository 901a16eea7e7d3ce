//! Thread-safe ordered list
//!
//! [`ConcurrentList`] wraps a `Vec<T>` behind a single gate. Every member
//! follows the same protocol:
//!
//! 1. Fail fast with [`ListError::Reentrancy`] if the calling thread is
//!    already running user code under this list's gate (checked without the
//!    gate, through the loop registry)
//! 2. Acquire the gate and mark the calling thread
//! 3. Perform one operation on the backing store
//! 4. Unmark and release the gate (guard drop, on every exit path)
//!
//! Bulk traversals (`for_indices`, `for_each`) hold the gate for the whole
//! pass plus the deferred-action drain, which makes them atomic with respect
//! to every other member. `defer` / `defer_with_items` are the one exception
//! to step 1: they *require* the calling thread to be inside a traversal
//! callback, and never touch the gate.
//!
//! # Thread Safety
//!
//! `ConcurrentList<T>` is `Send + Sync` whenever `T: Send`. Share it with
//! `Arc`; no member needs `&mut self` except [`ConcurrentList::get_mut`].

use crate::deferred::{DeferredAction, DeferredQueue};
use crate::gate::Gate;
use crate::registry::{LoopPhase, LoopRegistry};
use crate::snapshot::Snapshot;
use crate::traversal::Traversal;
use conlist_core::{ListError, ListOptions, Result, TraversalReport};
use std::fmt;
use std::mem;
use std::ops::{Bound, Range, RangeBounds};
use tracing::trace;

/// A lock-based, thread-safe list
///
/// # Example
///
/// ```
/// use conlist_concurrency::ConcurrentList;
///
/// let list = ConcurrentList::from_vec(vec![1, 2, 3]);
/// list.push(4).unwrap();
///
/// let report = list
///     .for_each(|item| {
///         let doubled = *item * 2;
///         list.defer_with_items(move |items| {
///             items.push(doubled);
///             Ok(())
///         })?;
///         Ok(())
///     })
///     .unwrap();
///
/// assert!(report.is_clean());
/// assert_eq!(list.to_vec().unwrap(), vec![1, 2, 3, 4, 2, 4, 6, 8]);
/// ```
pub struct ConcurrentList<T> {
    /// Backing store and the permit guarding it
    gate: Gate<Vec<T>>,
    /// Threads currently running callbacks under the gate
    registry: LoopRegistry,
    /// Actions queued by the running traversal
    deferred: DeferredQueue<T>,
    options: ListOptions,
}

impl<T> ConcurrentList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::with_options(ListOptions::default())
    }

    /// Create an empty list with explicit options
    pub fn with_options(options: ListOptions) -> Self {
        Self::from_vec_with_options(Vec::new(), options)
    }

    /// Create a list pre-populated from `items`
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_vec_with_options(items, ListOptions::default())
    }

    /// Create a list pre-populated from `items`, with explicit options
    pub fn from_vec_with_options(items: Vec<T>, options: ListOptions) -> Self {
        ConcurrentList {
            gate: Gate::new(items),
            registry: LoopRegistry::new(),
            deferred: DeferredQueue::new(),
            options,
        }
    }

    /// Options this list was created with
    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    /// Consume the list, returning the backing store
    pub fn into_inner(self) -> Vec<T> {
        self.gate.into_inner()
    }

    /// Direct access to the backing store
    ///
    /// `&mut self` already guarantees exclusivity, so no gate is involved.
    pub fn get_mut(&mut self) -> &mut Vec<T> {
        self.gate.get_mut()
    }

    // ========================================================================
    // Gate plumbing
    // ========================================================================

    fn check_not_in_loop(&self) -> Result<()> {
        if self.registry.is_current_in_loop() {
            trace!(list = %self.options.label, "rejected reentrant call from callback");
            return Err(ListError::Reentrancy);
        }
        Ok(())
    }

    /// Run `op` on the backing store under the gate
    ///
    /// `op` may run user code (predicates, caller iterators, `Clone`,
    /// `PartialEq`, `Drop`), so the thread is marked `Inspecting` and any call
    /// back into this list fails with `Reentrancy` instead of deadlocking.
    fn locked<R>(&self, op: impl FnOnce(&mut Vec<T>) -> R) -> Result<R> {
        self.check_not_in_loop()?;
        let mut items = self.gate.acquire();
        let _mark = self.registry.enter(LoopPhase::Inspecting);
        Ok(op(&mut items))
    }

    fn traversal(&self) -> Traversal<'_, T> {
        Traversal {
            registry: &self.registry,
            deferred: &self.deferred,
            options: &self.options,
        }
    }

    // ========================================================================
    // Pass-through operations
    // ========================================================================

    /// Number of elements
    pub fn len(&self) -> Result<usize> {
        self.locked(|items| items.len())
    }

    /// True if the list has no elements
    pub fn is_empty(&self) -> Result<bool> {
        self.locked(|items| items.is_empty())
    }

    /// Replace the element at `index`, returning the previous value
    pub fn set(&self, index: usize, value: T) -> Result<T> {
        self.locked(|items| {
            let len = items.len();
            match items.get_mut(index) {
                Some(slot) => Ok(mem::replace(slot, value)),
                None => Err(ListError::IndexOutOfRange { index, len }),
            }
        })?
    }

    /// Append one element
    pub fn push(&self, item: T) -> Result<()> {
        self.locked(|items| items.push(item))
    }

    /// Append every element of `iter`, in order, under one gate hold
    ///
    /// `iter` is consumed while the gate is held; calls it makes back into
    /// this list return [`ListError::Reentrancy`].
    pub fn extend<I>(&self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.locked(|items| items.extend(iter))
    }

    /// Remove every element
    pub fn clear(&self) -> Result<()> {
        self.locked(|items| items.clear())
    }

    /// Insert `item` at `index`, shifting later elements; `index == len` appends
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        self.locked(|items| {
            let len = items.len();
            if index > len {
                return Err(ListError::IndexOutOfRange { index, len });
            }
            items.insert(index, item);
            Ok(())
        })?
    }

    /// Remove and return the element at `index`
    pub fn remove_at(&self, index: usize) -> Result<T> {
        self.locked(|items| {
            let len = items.len();
            if index >= len {
                return Err(ListError::IndexOutOfRange { index, len });
            }
            Ok(items.remove(index))
        })?
    }

    /// Remove and return the elements in `range`
    ///
    /// Out-of-bounds ranges leave the list untouched.
    pub fn remove_range<R>(&self, range: R) -> Result<Vec<T>>
    where
        R: RangeBounds<usize>,
    {
        self.locked(|items| {
            let range = resolve_range(&range, items.len())?;
            Ok(items.drain(range).collect())
        })?
    }

    /// Remove every element matching `predicate`; returns how many were removed
    pub fn remove_all<P>(&self, mut predicate: P) -> Result<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.locked(|items| {
            let before = items.len();
            items.retain(|item| !predicate(item));
            before - items.len()
        })
    }

    /// Index of the first element matching `predicate`
    pub fn find_index<P>(&self, predicate: P) -> Result<Option<usize>>
    where
        P: FnMut(&T) -> bool,
    {
        self.locked(|items| items.iter().position(predicate))
    }

    /// Index of the last element matching `predicate`
    pub fn find_last_index<P>(&self, predicate: P) -> Result<Option<usize>>
    where
        P: FnMut(&T) -> bool,
    {
        self.locked(|items| items.iter().rposition(predicate))
    }

    /// True if any element matches `predicate`
    pub fn exists<P>(&self, mut predicate: P) -> Result<bool>
    where
        P: FnMut(&T) -> bool,
    {
        self.locked(|items| items.iter().any(|item| predicate(item)))
    }

    // ========================================================================
    // Bulk traversal
    // ========================================================================

    /// Call `action` once for every index in `0..len`, under one gate hold
    ///
    /// `len` is fixed when the pass starts. `action` must not call other
    /// members of this list (they return [`ListError::Reentrancy`]); it may
    /// queue work with [`Self::defer`] / [`Self::defer_with_items`].
    ///
    /// Failures of `action` and of deferred actions never abort the traversal;
    /// they are returned in the [`TraversalReport`]. The only `Err` is the
    /// up-front reentrancy check.
    pub fn for_indices<F>(&self, mut action: F) -> Result<TraversalReport>
    where
        F: FnMut(usize) -> anyhow::Result<()>,
    {
        self.check_not_in_loop()?;
        let mut items = self.gate.acquire();
        Ok(self.traversal().run(&mut items, |_, index| action(index)))
    }

    /// Call `action` once for every element, in order, under one gate hold
    ///
    /// Same contract as [`Self::for_indices`].
    pub fn for_each<F>(&self, mut action: F) -> Result<TraversalReport>
    where
        F: FnMut(&T) -> anyhow::Result<()>,
    {
        self.check_not_in_loop()?;
        let mut items = self.gate.acquire();
        Ok(self
            .traversal()
            .run(&mut items, |items, index| action(&items[index])))
    }

    /// [`Self::for_indices`] for async callers
    ///
    /// Waiting for the gate suspends the task instead of blocking its thread.
    /// The callback pass itself runs synchronously once the gate is held.
    pub async fn for_indices_async<F>(&self, mut action: F) -> Result<TraversalReport>
    where
        F: FnMut(usize) -> anyhow::Result<()>,
    {
        self.check_not_in_loop()?;
        let mut items = self.gate.acquire_async().await;
        Ok(self.traversal().run(&mut items, |_, index| action(index)))
    }

    /// [`Self::for_each`] for async callers
    pub async fn for_each_async<F>(&self, mut action: F) -> Result<TraversalReport>
    where
        F: FnMut(&T) -> anyhow::Result<()>,
    {
        self.check_not_in_loop()?;
        let mut items = self.gate.acquire_async().await;
        Ok(self
            .traversal()
            .run(&mut items, |items, index| action(&items[index])))
    }

    // ========================================================================
    // Deferred actions
    // ========================================================================

    fn check_visiting(&self) -> Result<()> {
        if !self.registry.is_current_visiting() {
            trace!(list = %self.options.label, "rejected deferred action outside traversal");
            return Err(ListError::NotInTraversal);
        }
        Ok(())
    }

    /// Queue `action` to run after the current traversal's callback pass
    ///
    /// Only callable from inside a `for_indices` / `for_each` callback on this
    /// list; anywhere else it returns [`ListError::NotInTraversal`]. Actions
    /// run in enqueue order before the traversal returns, with the gate still
    /// held, so they must not call back into the list.
    pub fn defer<A>(&self, action: A) -> Result<()>
    where
        A: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.check_visiting()?;
        self.deferred.push(DeferredAction::Detached(Box::new(action)));
        Ok(())
    }

    /// Queue an action that receives the backing store
    ///
    /// This is how a traversal mutates the list it is walking. Same rules as
    /// [`Self::defer`].
    pub fn defer_with_items<A>(&self, action: A) -> Result<()>
    where
        A: FnOnce(&mut Vec<T>) -> anyhow::Result<()> + Send + 'static,
    {
        self.check_visiting()?;
        self.deferred.push(DeferredAction::WithItems(Box::new(action)));
        Ok(())
    }
}

impl<T: Clone> ConcurrentList<T> {
    /// Clone of the element at `index`
    pub fn get(&self, index: usize) -> Result<T> {
        self.locked(|items| {
            items.get(index).cloned().ok_or(ListError::IndexOutOfRange {
                index,
                len: items.len(),
            })
        })?
    }

    /// Clone every element into `dest` starting at `offset`
    pub fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<()> {
        self.locked(|items| {
            let needed = items.len();
            let available = dest.len();
            if offset > available || available - offset < needed {
                return Err(ListError::DestinationTooSmall {
                    offset,
                    needed,
                    available,
                });
            }
            dest[offset..offset + needed].clone_from_slice(items.as_slice());
            Ok(())
        })?
    }

    /// First element matching `predicate`
    pub fn find<P>(&self, mut predicate: P) -> Result<Option<T>>
    where
        P: FnMut(&T) -> bool,
    {
        self.locked(|items| items.iter().find(|item| predicate(item)).cloned())
    }

    /// Last element matching `predicate`
    pub fn find_last<P>(&self, mut predicate: P) -> Result<Option<T>>
    where
        P: FnMut(&T) -> bool,
    {
        self.locked(|items| items.iter().rev().find(|item| predicate(item)).cloned())
    }

    /// Every element matching `predicate`, in order
    pub fn find_all<P>(&self, mut predicate: P) -> Result<Vec<T>>
    where
        P: FnMut(&T) -> bool,
    {
        self.locked(|items| {
            items
                .iter()
                .filter(|item| predicate(item))
                .cloned()
                .collect()
        })
    }

    /// Copy of the current contents
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.locked(|items| items.clone())
    }

    /// Point-in-time iterator over the current contents
    ///
    /// The gate is held only while copying. Later mutations are not visible
    /// through the returned [`Snapshot`], and dropping it early never leaves
    /// the list locked.
    pub fn snapshot(&self) -> Result<Snapshot<T>> {
        self.to_vec().map(Snapshot::new)
    }

    /// [`Self::snapshot`] for async callers
    pub async fn snapshot_async(&self) -> Result<Snapshot<T>> {
        self.check_not_in_loop()?;
        let items = self.gate.acquire_async().await;
        let _mark = self.registry.enter(LoopPhase::Inspecting);
        Ok(Snapshot::new(items.clone()))
    }
}

impl<T: PartialEq> ConcurrentList<T> {
    /// True if some element equals `item`
    pub fn contains(&self, item: &T) -> Result<bool> {
        self.locked(|items| items.contains(item))
    }

    /// Index of the first element equal to `item`
    pub fn index_of(&self, item: &T) -> Result<Option<usize>> {
        self.locked(|items| items.iter().position(|candidate| candidate == item))
    }

    /// Remove the first element equal to `item`; false if there was none
    pub fn remove(&self, item: &T) -> Result<bool> {
        self.locked(|items| match items.iter().position(|candidate| candidate == item) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        })
    }
}

/// Turn `range` into a concrete `start..end` within `0..len`
fn resolve_range<R: RangeBounds<usize>>(range: &R, len: usize) -> Result<Range<usize>> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    if start > end || end > len {
        return Err(ListError::RangeOutOfBounds { start, end, len });
    }
    Ok(start..end)
}

impl<T> Default for ConcurrentList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for ConcurrentList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T> FromIterator<T> for ConcurrentList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for ConcurrentList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ConcurrentList");
        debug.field("label", &self.options.label);
        // Never block: Debug may run from inside a callback holding the gate.
        match self.gate.try_acquire() {
            Some(items) => {
                let _mark = self.registry.enter(LoopPhase::Inspecting);
                debug.field("items", &*items)
            }
            None => debug.field("items", &format_args!("<locked>")),
        };
        debug.finish()
    }
}

//! Exclusive access gate
//!
//! A binary permit guarding a single value. The permit can be acquired in two
//! styles over the same state:
//!
//! - [`Gate::acquire`] parks the calling thread (parking_lot `Condvar`)
//! - [`Gate::acquire_async`] suspends the calling task (tokio `Notify`) and
//!   never blocks an executor thread
//!
//! Release happens in [`GateGuard`]'s `Drop`, so it runs exactly once on every
//! exit path, unwinding included.
//!
//! # Ordering
//!
//! Grant order is unspecified. A release wakes one parked thread and one
//! suspended task; whichever reaches the permit first wins and the other goes
//! back to waiting. Mutual exclusion is absolute.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};
use std::pin::pin;
use tokio::sync::Notify;
use tracing::trace;

/// Binary permit plus the value it guards
pub struct Gate<T> {
    /// `true` while some guard is alive
    held: Mutex<bool>,
    /// Wakes parked threads on release
    available: Condvar,
    /// Wakes suspended tasks on release
    released: Notify,
    /// Guarded value
    ///
    /// Only locked by the permit holder, so this lock is never contended.
    value: Mutex<T>,
}

impl<T> Gate<T> {
    /// Create an available gate around `value`
    pub fn new(value: T) -> Self {
        Gate {
            held: Mutex::new(false),
            available: Condvar::new(),
            released: Notify::new(),
            value: Mutex::new(value),
        }
    }

    /// Block the calling thread until it is the sole holder
    pub fn acquire(&self) -> GateGuard<'_, T> {
        let mut held = self.held.lock();
        if *held {
            trace!("gate contended, parking thread");
        }
        while *held {
            self.available.wait(&mut held);
        }
        *held = true;
        drop(held);
        self.guard()
    }

    /// Suspend the calling task until it is the sole holder
    pub async fn acquire_async(&self) -> GateGuard<'_, T> {
        loop {
            // Register interest before checking, so a release between the
            // check and the await is not lost.
            let mut notified = pin!(self.released.notified());
            notified.as_mut().enable();

            if self.take_permit() {
                break;
            }
            trace!("gate contended, suspending task");
            notified.await;
        }
        // Built after the last await: the guard is not Send.
        self.guard()
    }

    /// Take the permit only if it is available right now
    pub fn try_acquire(&self) -> Option<GateGuard<'_, T>> {
        if self.take_permit() {
            Some(self.guard())
        } else {
            None
        }
    }

    /// True while some guard is alive
    #[cfg(test)]
    pub fn is_held(&self) -> bool {
        *self.held.lock()
    }

    /// Exclusive access without the permit; `&mut self` already proves it
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    /// Consume the gate, returning the guarded value
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    fn take_permit(&self) -> bool {
        let mut held = self.held.lock();
        if *held {
            return false;
        }
        *held = true;
        true
    }

    fn guard(&self) -> GateGuard<'_, T> {
        GateGuard {
            gate: self,
            value: Some(self.value.lock()),
        }
    }

    fn release(&self) {
        *self.held.lock() = false;
        self.available.notify_one();
        self.released.notify_one();
    }
}

impl<T: Default> Default for Gate<T> {
    fn default() -> Self {
        Gate::new(T::default())
    }
}

/// Proof of holding the gate; releases it when dropped
pub struct GateGuard<'a, T> {
    gate: &'a Gate<T>,
    /// Always `Some` until `drop`
    value: Option<MutexGuard<'a, T>>,
}

impl<T> Deref for GateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.value {
            Some(value) => value,
            None => unreachable!("gate guard used after release"),
        }
    }
}

impl<T> DerefMut for GateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.value {
            Some(value) => value,
            None => unreachable!("gate guard used after release"),
        }
    }
}

impl<T> Drop for GateGuard<'_, T> {
    fn drop(&mut self) {
        // Unlock the value before handing the permit to the next holder.
        self.value.take();
        self.gate.release();
    }
}

#![forbid(unsafe_code)]

//! Shared, version-tracked state cell with change notification.
//!
//! # Design
//!
//! [`StateCell<T>`] holds a value in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). It is the per-component-instance record a
//! [`FutureBinding`](crate::FutureBinding) keeps across renders, and the only
//! place an invocation's continuation is allowed to write to.
//!
//! Unlike a plain observable, every [`replace`](StateCell::replace) counts as
//! a change: future outcomes are not required to be `PartialEq`, so the cell
//! cannot tell an equal value apart. Callers that want "no-op on no change"
//! check the current value first with [`with`](StateCell::with).
//!
//! # Failure Modes
//!
//! - **Re-entrant write**: calling `replace()` from within a subscriber
//!   callback panics (RefCell borrow rules). Subscribers should schedule a
//!   re-render, not perform one inline.
//! - **Subscriber leak**: dead weak references are pruned lazily on the next
//!   notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct CellInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning a `StateCell` creates a new handle to the **same** storage.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each `replace`.
/// 2. Subscribers are notified in registration order, after the write.
/// 3. A dropped [`Subscription`] is never called again.
pub struct StateCell<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StateCell")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: 'static> StateCell<T> {
    /// Create a cell at version 0 with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Overwrite the value, bump the version and notify live subscribers.
    ///
    /// Returns the previous value.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from within a subscriber callback.
    pub fn replace(&self, value: T) -> T {
        let previous = {
            let mut inner = self.inner.borrow_mut();
            inner.version += 1;
            std::mem::replace(&mut inner.value, value)
        };
        self.notify();
        previous
    }

    /// Register a change callback. Dropping the returned guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of writes since construction.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };
        if callbacks.is_empty() {
            return;
        }

        // Shared borrow only: callbacks may read the cell, not write or subscribe.
        let inner = self.inner.borrow();
        for cb in &callbacks {
            cb(&inner.value);
        }
    }
}

/// RAII guard for a [`StateCell`] subscriber.
///
/// Holds the only strong reference to the callback; once dropped the cell's
/// weak entry fails to upgrade and is pruned on the next notification.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

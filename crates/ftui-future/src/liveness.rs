#![forbid(unsafe_code)]

//! Revocable per-invocation write capability.
//!
//! Every invocation of a binding's factory gets a fresh [`LiveFlag`]. The
//! binding keeps the flag; the spawned continuation gets a [`LiveToken`] and
//! checks it before touching shared state. Revoking the flag (on the next
//! invocation, or on teardown) silences the continuation permanently without
//! aborting the underlying future.
//!
//! The pair is `Rc<Cell<bool>>` and therefore `!Send`: the single-threaded
//! ordering guarantee (a revoke is visible before any later write is
//! attempted) holds by construction.

use std::cell::Cell;
use std::rc::Rc;

/// Owner side of a liveness flag. Live from construction until revoked.
#[derive(Debug)]
pub struct LiveFlag {
    live: Rc<Cell<bool>>,
}

impl Default for LiveFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveFlag {
    /// Create a live flag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: Rc::new(Cell::new(true)),
        }
    }

    /// Hand out a check-only token tied to this flag.
    #[must_use]
    pub fn token(&self) -> LiveToken {
        LiveToken {
            live: Rc::clone(&self.live),
        }
    }

    /// Permanently revoke. Returns whether the flag was live before the call.
    pub fn revoke(&self) -> bool {
        self.live.replace(false)
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.get()
    }
}

/// Check-only half of a [`LiveFlag`], carried by a spawned continuation.
#[derive(Debug, Clone)]
pub struct LiveToken {
    live: Rc<Cell<bool>>,
}

impl LiveToken {
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Run `write` only while the owning flag is still live.
    ///
    /// Returns `None` without calling `write` once revoked.
    pub fn guard<R>(&self, write: impl FnOnce() -> R) -> Option<R> {
        self.is_live().then(write)
    }
}

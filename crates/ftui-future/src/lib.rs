#![forbid(unsafe_code)]

//! Future-backed state bindings for FrankenTUI components.
//!
//! A component that needs data from an asynchronous source keeps one
//! [`FutureBinding`] per source and activates it on every render:
//!
//! ```ignore
//! let (value, error, loading) = binding.bind(|| fetch(id), id);
//! ```
//!
//! The binding runs the factory on the first render and whenever the
//! dependency list changes, exposes the latest invocation's
//! `(value, error, loading)` triple, and stops listening to an invocation as
//! soon as it is superseded or the component is torn down.
//!
//! - [`FutureState`]: Pending / Resolved / Rejected, projected to the triple.
//! - [`StateCell`]: shared, version-tracked state with [`Subscription`]s.
//! - [`LiveFlag`] / [`LiveToken`]: revocable per-invocation write capability.
//! - [`DepsTracker`]: memoized re-run trigger on a `PartialEq` dependency list.
//! - [`Spawner`]: where continuations run (e.g. a `futures` `LocalPool`).
//!
//! # Architecture
//!
//! Everything is `Rc`/`RefCell`/`Cell` and `!Send`. Continuations resume on
//! the same thread as the render loop, so a revoke performed during one
//! render is always observed before any later write is attempted. The
//! underlying futures are never aborted; only their effect on the state is
//! suppressed.
//!
//! # Invariants
//!
//! 1. At most one of value/error is present; both are absent while loading.
//! 2. `loading` is true exactly while the latest invocation is unsettled.
//! 3. Unchanged dependencies never re-run the factory nor touch the state.
//! 4. Writes from invocation N all precede the start of invocation N+1.
//! 5. After teardown the state never changes again.

pub mod binding;
pub mod cell;
pub mod config;
pub mod deps;
pub mod error;
pub mod liveness;
pub mod spawn;
pub mod state;

pub use binding::FutureBinding;
pub use cell::{StateCell, Subscription};
pub use config::BindingConfig;
pub use deps::DepsTracker;
pub use error::{BindingError, Result};
pub use liveness::{LiveFlag, LiveToken};
pub use spawn::{LocalTask, SpawnFn, Spawner};
pub use state::{FutureState, Settlement};

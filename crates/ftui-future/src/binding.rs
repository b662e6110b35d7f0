#![forbid(unsafe_code)]

//! Future-backed `(value, error, loading)` binding for a component.
//!
//! # Usage
//!
//! ```ignore
//! use futures::executor::LocalPool;
//! use ftui_future::FutureBinding;
//!
//! let mut pool = LocalPool::new();
//! let mut profile: FutureBinding<Profile, ApiError, UserId> =
//!     FutureBinding::new(pool.spawner());
//!
//! // Every render:
//! let (value, error, loading) = profile.bind(|| api.fetch_profile(user_id), user_id);
//!
//! // Event loop, between renders:
//! pool.run_until_stalled();
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! PENDING(live) --factory fails-------> REJECTED   settlement = FailedSync
//! PENDING(live) --future resolves-----> RESOLVED   settlement = Resolved
//! PENDING(live) --future rejects------> REJECTED   settlement = Rejected
//! any           --deps change/teardown--> previous invocation silenced
//! ```
//!
//! # Invariants
//!
//! 1. The factory runs on the first activation and whenever the dependency
//!    list differs from the previous activation's; never otherwise.
//! 2. Starting an invocation revokes the previous one before anything else is
//!    written, so outcomes of invocation N can never land after N+1 started.
//! 3. `loading` flips to `false` at most once per invocation.
//! 4. After teardown the state is frozen: no factory calls, no writes.
//! 5. Outcomes of a revoked invocation are dropped without a write or a log
//!    event. The underlying future still runs to completion.
//!
//! # Failure Modes
//!
//! - **Factory panics**: the panic propagates out of `bind`; only `Err` is
//!   treated as a construction failure.
//! - **Executor refuses the task**: the invocation stays pending (like a
//!   future that never settles); the error is logged at `warn` and kept in
//!   [`FutureBinding::spawn_error`].

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use tracing::{Instrument, Span, debug, debug_span, trace, warn};

use crate::cell::{StateCell, Subscription};
use crate::config::BindingConfig;
use crate::deps::DepsTracker;
use crate::error::{BindingError, Result};
use crate::liveness::{LiveFlag, LiveToken};
use crate::spawn::Spawner;
use crate::state::{FutureState, Settlement};

/// Keeps a component's view of its latest future in sync across renders.
///
/// `D` is the dependency list; the default `()` runs the factory once.
/// Dropping the binding tears it down.
pub struct FutureBinding<T, E, D = ()> {
    config: BindingConfig,
    spawner: Rc<dyn Spawner>,
    state: StateCell<FutureState<T, E>>,
    /// Written together with `state` by whichever side settles the invocation.
    settlement: Rc<Cell<Option<Settlement>>>,
    deps: DepsTracker<D>,
    live: Option<LiveFlag>,
    generation: u64,
    spawn_error: Option<BindingError>,
    torn_down: bool,
}

impl<T, E, D> FutureBinding<T, E, D> {
    /// Revoke the in-flight invocation and freeze the state.
    ///
    /// Idempotent. Called automatically on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Some(flag) = self.live.take() {
            flag.revoke();
        }
        debug!(
            label = %self.config.label,
            generation = self.generation,
            "future binding torn down"
        );
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Number of invocations started so far (the current one's id).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// How the current invocation settled, or `None` while it is pending
    /// (or before the first activation).
    #[must_use]
    pub fn settlement(&self) -> Option<Settlement> {
        self.settlement.get()
    }

    /// Why the current invocation could not be scheduled, if it could not.
    #[must_use]
    pub fn spawn_error(&self) -> Option<&BindingError> {
        self.spawn_error.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &BindingConfig {
        &self.config
    }
}

impl<T: 'static, E: 'static, D: PartialEq + 'static> FutureBinding<T, E, D> {
    /// Create an inactive binding that schedules work on `spawner`.
    pub fn new(spawner: impl Spawner + 'static) -> Self {
        Self::with_config(spawner, BindingConfig::default())
    }

    pub fn with_config(spawner: impl Spawner + 'static, config: BindingConfig) -> Self {
        Self {
            config,
            spawner: Rc::new(spawner),
            state: StateCell::new(FutureState::Pending),
            settlement: Rc::new(Cell::new(None)),
            deps: DepsTracker::new(),
            live: None,
            generation: 0,
            spawn_error: None,
            torn_down: false,
        }
    }

    /// Activate the binding for one render with an infallible factory.
    ///
    /// Runs `factory` only if this is the first activation or `deps` changed,
    /// then returns `(value, error, loading)` as of right now. The returned
    /// triple never reflects the outcome of a future started by this call.
    pub fn bind<F, Fut>(&mut self, factory: F, deps: D) -> (Option<T>, Option<E>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>> + 'static,
        T: Clone,
        E: Clone,
    {
        self.try_bind(|| Ok(factory()), deps)
    }

    /// Like [`bind`](Self::bind), for factories that can fail before
    /// producing a future. An `Err` settles the invocation immediately.
    pub fn try_bind<F, Fut>(&mut self, factory: F, deps: D) -> (Option<T>, Option<E>, bool)
    where
        F: FnOnce() -> std::result::Result<Fut, E>,
        Fut: Future<Output = std::result::Result<T, E>> + 'static,
        T: Clone,
        E: Clone,
    {
        self.activate(factory, deps);
        self.state().into_parts()
    }

    /// Run the activation step without cloning the state out.
    ///
    /// Returns whether a new invocation was started.
    pub fn activate<F, Fut>(&mut self, factory: F, deps: D) -> bool
    where
        F: FnOnce() -> std::result::Result<Fut, E>,
        Fut: Future<Output = std::result::Result<T, E>> + 'static,
    {
        if self.torn_down {
            trace!(label = %self.config.label, "activation after teardown ignored");
            return false;
        }
        if !self.deps.changed(deps) {
            trace!(
                label = %self.config.label,
                generation = self.generation,
                "dependencies unchanged, reusing state"
            );
            return false;
        }
        self.start(factory);
        true
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> FutureState<T, E>
    where
        T: Clone,
        E: Clone,
    {
        self.state.get()
    }

    /// Borrow the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&FutureState<T, E>) -> R) -> R {
        self.state.with(f)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.with(FutureState::is_loading)
    }

    /// Number of state writes so far. Unchanged between two reads means the
    /// state is the same value, not merely an equal one.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    /// Be notified after every state write. The host typically schedules a
    /// re-render from here; re-entrant `bind` calls from the callback panic.
    pub fn subscribe(&self, callback: impl Fn(&FutureState<T, E>) + 'static) -> Subscription {
        self.state.subscribe(callback)
    }

    fn start<F, Fut>(&mut self, factory: F)
    where
        F: FnOnce() -> std::result::Result<Fut, E>,
        Fut: Future<Output = std::result::Result<T, E>> + 'static,
    {
        if let Some(previous) = self.live.take() {
            previous.revoke();
            debug!(
                label = %self.config.label,
                generation = self.generation,
                "dependencies changed, superseding invocation"
            );
        }

        self.generation += 1;
        self.spawn_error = None;
        self.settlement.set(None);
        if !self.is_loading() {
            self.state.replace(FutureState::Pending);
        }

        let flag = LiveFlag::new();
        let token = flag.token();
        self.live = Some(flag);

        let span = debug_span!(
            "future_binding",
            label = %self.config.label,
            generation = self.generation
        );
        let outcome = span.in_scope(|| {
            debug!("invoking factory");
            factory()
        });

        match outcome {
            Err(error) => {
                let _enter = span.enter();
                token.guard(|| {
                    self.settlement.set(Some(Settlement::FailedSync));
                    self.state.replace(FutureState::Rejected(error));
                    debug!(settlement = %Settlement::FailedSync, "invocation settled");
                });
            }
            Ok(future) => {
                if let Err(err) = self.spawn_invocation(future, token, span) {
                    warn!(
                        label = %self.config.label,
                        generation = self.generation,
                        error = %err,
                        "invocation could not be scheduled; staying pending"
                    );
                    self.spawn_error = Some(err);
                }
            }
        }
    }

    fn spawn_invocation<Fut>(&self, future: Fut, token: LiveToken, span: Span) -> Result<()>
    where
        Fut: Future<Output = std::result::Result<T, E>> + 'static,
    {
        let state = self.state.clone();
        let settlement = Rc::clone(&self.settlement);
        let task = async move {
            let result = future.await;
            token.guard(|| {
                let kind = Settlement::of(&result);
                settlement.set(Some(kind));
                state.replace(FutureState::from_result(result));
                debug!(settlement = %kind, "invocation settled");
            });
        }
        .instrument(span);

        self.spawner
            .spawn_task(task.boxed_local())
            .map_err(|source| {
                BindingError::spawn(self.config.label.to_string(), self.generation, source)
            })
    }
}

impl<T: 'static, E: 'static> FutureBinding<T, E, ()> {
    /// [`bind`](Self::bind) with an empty dependency list: the factory runs
    /// on the first activation only.
    pub fn bind_once<F, Fut>(&mut self, factory: F) -> (Option<T>, Option<E>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>> + 'static,
        T: Clone,
        E: Clone,
    {
        self.bind(factory, ())
    }
}

impl<T, E, D> Drop for FutureBinding<T, E, D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<T: fmt::Debug, E: fmt::Debug, D: fmt::Debug> fmt::Debug for FutureBinding<T, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutureBinding")
            .field("label", &self.config.label)
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("deps", &self.deps.current())
            .field("settlement", &self.settlement.get())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::{LocalTask, SpawnFn};
    use futures::channel::oneshot;
    use futures::executor::LocalPool;
    use futures::future;
    use futures::task::SpawnError;
    use std::cell::RefCell;
    use tracing_test::traced_test;

    type Binding<D = ()> = FutureBinding<&'static str, &'static str, D>;

    fn pending_pair() -> (
        oneshot::Sender<std::result::Result<&'static str, &'static str>>,
        impl Future<Output = std::result::Result<&'static str, &'static str>>,
    ) {
        let (tx, rx) = oneshot::channel();
        (tx, async move { rx.await.unwrap_or(Err("sender dropped")) })
    }

    #[test]
    fn starts_pending_and_resolves() {
        let mut pool = LocalPool::new();
        let mut binding: Binding = FutureBinding::new(pool.spawner());

        assert_eq!(binding.bind_once(|| future::ok("x")), (None, None, true));
        assert_eq!(binding.generation(), 1);
        assert_eq!(binding.settlement(), None);

        pool.run_until_stalled();
        assert_eq!(binding.bind_once(|| future::ok("y")), (Some("x"), None, false));
        assert_eq!(binding.settlement(), Some(Settlement::Resolved));
        assert_eq!(binding.generation(), 1);
    }

    #[test]
    fn sync_failure_settles_without_spawning() {
        let spawned = Rc::new(Cell::new(0u32));
        let spawned_clone = Rc::clone(&spawned);
        let spawner = SpawnFn::new(move |_task: LocalTask| {
            spawned_clone.set(spawned_clone.get() + 1);
            Ok(())
        });
        let mut binding: Binding = FutureBinding::new(spawner);

        let triple = binding.try_bind(|| Err::<future::Ready<_>, _>("boom"), ());
        assert_eq!(triple, (None, Some("boom"), false));
        assert_eq!(binding.settlement(), Some(Settlement::FailedSync));
        assert_eq!(spawned.get(), 0);
    }

    #[test]
    fn reset_to_pending_is_silent_when_already_pending() {
        let mut pool = LocalPool::new();
        let mut binding: Binding<u8> = FutureBinding::new(pool.spawner());

        binding.bind(|| future::pending(), 1);
        assert_eq!(binding.version(), 0);
        binding.bind(|| future::pending(), 2);
        assert_eq!(binding.version(), 0);
        assert_eq!(binding.generation(), 2);
        pool.run_until_stalled();
        assert!(binding.is_loading());
    }

    #[test]
    fn rerun_after_settle_resets_visibly() {
        let mut pool = LocalPool::new();
        let mut binding: Binding<u8> = FutureBinding::new(pool.spawner());

        binding.bind(|| future::ok("first"), 1);
        pool.run_until_stalled();
        assert_eq!(binding.version(), 1);

        let triple = binding.bind(|| future::ok("second"), 2);
        assert_eq!(triple, (None, None, true));
        assert_eq!(binding.version(), 2);
        assert_eq!(binding.settlement(), None);

        pool.run_until_stalled();
        assert_eq!(binding.state(), FutureState::Resolved("second"));
    }

    #[test]
    fn superseded_outcome_is_discarded() {
        let mut pool = LocalPool::new();
        let mut binding: Binding<u8> = FutureBinding::new(pool.spawner());
        let (old_tx, old_future) = pending_pair();
        let (new_tx, new_future) = pending_pair();

        binding.bind(move || old_future, 1);
        binding.bind(move || new_future, 2);

        new_tx.send(Ok("new")).unwrap();
        pool.run_until_stalled();
        assert_eq!(binding.state(), FutureState::Resolved("new"));
        let version = binding.version();

        old_tx.send(Ok("old")).unwrap();
        pool.run_until_stalled();
        assert_eq!(binding.state(), FutureState::Resolved("new"));
        assert_eq!(binding.version(), version);
    }

    #[test]
    fn teardown_freezes_state_and_ignores_activations() {
        let mut pool = LocalPool::new();
        let mut binding: Binding<u8> = FutureBinding::new(pool.spawner());
        let (tx, fut) = pending_pair();

        binding.bind(move || fut, 1);
        binding.teardown();
        assert!(binding.is_torn_down());

        tx.send(Ok("late")).unwrap();
        pool.run_until_stalled();
        assert_eq!(binding.state(), FutureState::Pending);

        let called = Cell::new(false);
        binding.bind(
            || {
                called.set(true);
                future::ok("never")
            },
            2,
        );
        assert!(!called.get());
        assert_eq!(binding.generation(), 1);
    }

    #[test]
    fn drop_revokes_in_flight_invocation() {
        let mut pool = LocalPool::new();
        let mut binding: Binding = FutureBinding::new(pool.spawner());
        let (tx, fut) = pending_pair();
        binding.bind_once(move || fut);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let sub = binding.subscribe(move |s| seen_clone.borrow_mut().push(s.clone()));

        drop(binding);
        tx.send(Ok("late")).unwrap();
        pool.run_until_stalled();

        assert!(seen.borrow().is_empty());
        drop(sub);
    }

    #[test]
    fn refused_spawn_stays_pending_and_records_error() {
        let mut binding: Binding = FutureBinding::with_config(
            SpawnFn::new(|_task| Err(SpawnError::shutdown())),
            BindingConfig::labeled("refused"),
        );

        assert_eq!(binding.bind_once(|| future::ok("x")), (None, None, true));
        let err = binding.spawn_error().expect("spawn error recorded");
        assert!(err.is_shutdown());
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn spawn_error_is_cleared_by_next_invocation() {
        let mut pool = LocalPool::new();
        let accepting = Rc::new(Cell::new(false));
        let accepting_clone = Rc::clone(&accepting);
        let spawner = pool.spawner();
        let mut binding: Binding<u8> = FutureBinding::new(SpawnFn::new(move |task| {
            if accepting_clone.get() {
                spawner.spawn_task(task)
            } else {
                Err(SpawnError::shutdown())
            }
        }));

        binding.bind(|| future::ok("refused"), 1);
        assert!(binding.spawn_error().is_some());

        accepting.set(true);
        assert_eq!(binding.bind(|| future::ok("accepted"), 2), (None, None, true));
        assert!(binding.spawn_error().is_none());
        assert_eq!(binding.generation(), 2);

        pool.run_until_stalled();
        assert_eq!(binding.state(), FutureState::Resolved("accepted"));
        assert_eq!(binding.settlement(), Some(Settlement::Resolved));
        assert!(binding.spawn_error().is_none());
    }

    #[test]
    fn debug_includes_label_and_state() {
        let pool = LocalPool::new();
        let binding: Binding =
            FutureBinding::with_config(pool.spawner(), BindingConfig::labeled("dbg"));
        let dbg = format!("{binding:?}");
        assert!(dbg.contains("dbg"));
        assert!(dbg.contains("Pending"));
    }

    #[traced_test]
    #[test]
    fn lifecycle_events_are_logged() {
        let mut pool = LocalPool::new();
        let mut binding: Binding = FutureBinding::with_config(
            pool.spawner(),
            BindingConfig::labeled("logged"),
        );

        binding.bind_once(|| future::ok("x"));
        pool.run_until_stalled();

        assert!(logs_contain("invoking factory"));
        assert!(logs_contain("invocation settled"));
        assert!(logs_contain("resolved"));
    }

    #[traced_test]
    #[test]
    fn discarded_outcomes_are_not_logged() {
        let mut pool = LocalPool::new();
        let mut binding: Binding = FutureBinding::new(pool.spawner());
        let (tx, fut) = pending_pair();

        binding.bind_once(move || fut);
        binding.teardown();
        tx.send(Err("late")).unwrap();
        pool.run_until_stalled();

        assert!(logs_contain("torn down"));
        assert!(!logs_contain("invocation settled"));
        assert!(!logs_contain("late"));
    }
}

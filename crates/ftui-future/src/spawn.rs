#![forbid(unsafe_code)]

//! Seam between bindings and the host's single-threaded event queue.
//!
//! A binding never polls futures itself. It wraps the factory's future in a
//! continuation that writes the outcome back (while live) and hands that
//! continuation to a [`Spawner`]. The host decides when it runs: a
//! `futures::executor::LocalPool` ticked from the render loop, a
//! browser microtask queue, or anything else that can drive `!Send` futures
//! on the UI thread.

use std::fmt;

use futures::executor::LocalSpawner;
use futures::future::LocalBoxFuture;
use futures::task::{LocalSpawnExt, SpawnError};

/// A continuation handed to the host. Always `'static` and `!Send`.
pub type LocalTask = LocalBoxFuture<'static, ()>;

/// Something that can schedule a [`LocalTask`] on the UI thread.
pub trait Spawner {
    /// Schedule `task`. Must not poll it inline.
    fn spawn_task(&self, task: LocalTask) -> Result<(), SpawnError>;
}

impl Spawner for LocalSpawner {
    fn spawn_task(&self, task: LocalTask) -> Result<(), SpawnError> {
        self.spawn_local(task)
    }
}

impl<S: Spawner + ?Sized> Spawner for std::rc::Rc<S> {
    fn spawn_task(&self, task: LocalTask) -> Result<(), SpawnError> {
        (**self).spawn_task(task)
    }
}

/// Adapter turning a closure into a [`Spawner`].
///
/// ```ignore
/// let spawner = SpawnFn::new(|task| {
///     wasm_bindgen_futures::spawn_local(task);
///     Ok(())
/// });
/// ```
#[derive(Clone, Copy)]
pub struct SpawnFn<F>(pub F);

impl<F> SpawnFn<F>
where
    F: Fn(LocalTask) -> Result<(), SpawnError>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Spawner for SpawnFn<F>
where
    F: Fn(LocalTask) -> Result<(), SpawnError>,
{
    fn spawn_task(&self, task: LocalTask) -> Result<(), SpawnError> {
        (self.0)(task)
    }
}

impl<F> fmt::Debug for SpawnFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnFn").finish_non_exhaustive()
    }
}

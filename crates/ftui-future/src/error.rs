#![forbid(unsafe_code)]

//! Errors raised by the binding machinery.

use futures::task::SpawnError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BindingError>;

/// Failures of the binding machinery itself.
///
/// Factory and future failures are never wrapped in this type; they land in
/// the state's error slot as-is.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("executor refused task for binding `{label}` (generation {generation}): {source}")]
    Spawn {
        label: String,
        generation: u64,
        #[source]
        source: SpawnError,
    },
}

impl BindingError {
    #[must_use]
    pub fn spawn(label: impl Into<String>, generation: u64, source: SpawnError) -> Self {
        Self::Spawn {
            label: label.into(),
            generation,
            source,
        }
    }

    /// Whether the executor refused the task because it is shutting down.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        match self {
            Self::Spawn { source, .. } => source.is_shutdown(),
        }
    }
}

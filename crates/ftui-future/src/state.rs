#![forbid(unsafe_code)]

//! The observable `(value, error, loading)` state of a future binding.

use std::fmt;

/// Current state of the most recent invocation of a binding's factory.
///
/// Exactly one of three phases. The enum makes "value and error both present"
/// unrepresentable; [`parts`](Self::parts) projects it onto the
/// `(value, error, loading)` triple that render code consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FutureState<T, E> {
    /// The latest invocation has not settled yet.
    #[default]
    Pending,
    /// The latest invocation resolved with a value.
    Resolved(T),
    /// The latest invocation failed, either while constructing its future or
    /// when the future itself rejected.
    Rejected(E),
}

impl<T, E> FutureState<T, E> {
    /// Whether the latest invocation is still in flight.
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The resolved value, if any.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    /// The captured error, if any.
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Rejected(error) => Some(error),
            _ => None,
        }
    }

    /// Borrowing `(value, error, loading)` projection.
    #[must_use]
    pub fn parts(&self) -> (Option<&T>, Option<&E>, bool) {
        (self.value(), self.error(), self.is_loading())
    }

    /// Owning `(value, error, loading)` projection.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, Option<E>, bool) {
        match self {
            Self::Pending => (None, None, true),
            Self::Resolved(value) => (Some(value), None, false),
            Self::Rejected(error) => (None, Some(error), false),
        }
    }

    /// Build a settled state from a future's output.
    #[must_use]
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Resolved(value),
            Err(error) => Self::Rejected(error),
        }
    }
}

/// How an invocation reached its terminal state.
///
/// The observable state does not distinguish the two failure paths (both land
/// in the error slot unwrapped); this is kept alongside for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Settlement {
    /// The factory failed before producing a future.
    FailedSync,
    /// The future resolved.
    Resolved,
    /// The future rejected.
    Rejected,
}

impl Settlement {
    /// Classify an asynchronous outcome.
    #[must_use]
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Self::Resolved
        } else {
            Self::Rejected
        }
    }

    /// Stable lowercase name, used as a log field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailedSync => "failed_sync",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

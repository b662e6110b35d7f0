#![forbid(unsafe_code)]

//! Memoized re-run trigger keyed on a dependency list.
//!
//! A dependency list is any `D: PartialEq`. `PartialEq` on tuples, arrays,
//! slices and `Vec` is shallow element-wise comparison (length, then each
//! element), which is exactly the "did anything change" test a binding needs.
//! Heterogeneous keys go in a tuple; `()` is the empty list and never
//! changes after the first activation.

/// Stores the last dependency list and decides whether an activation must
/// re-run.
#[derive(Debug, Clone)]
pub struct DepsTracker<D> {
    last: Option<D>,
}

impl<D> Default for DepsTracker<D> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<D: PartialEq> DepsTracker<D> {
    /// A tracker that has never seen an activation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `next` and report whether it differs from the previous list.
    ///
    /// The first call always returns `true`. When the lists are equal the
    /// stored list is kept and `next` is dropped.
    pub fn changed(&mut self, next: D) -> bool {
        if self.last.as_ref().is_some_and(|prev| *prev == next) {
            return false;
        }
        self.last = Some(next);
        true
    }
}

impl<D> DepsTracker<D> {
    /// Whether any activation has been recorded.
    #[must_use]
    pub fn is_primed(&self) -> bool {
        self.last.is_some()
    }

    /// The most recently recorded list.
    #[must_use]
    pub fn current(&self) -> Option<&D> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_activation_always_runs() {
        let mut deps = DepsTracker::new();
        assert!(!deps.is_primed());
        assert!(deps.changed(()));
        assert!(deps.is_primed());
    }

    #[test]
    fn empty_list_runs_once() {
        let mut deps = DepsTracker::new();
        assert!(deps.changed(()));
        for _ in 0..10 {
            assert!(!deps.changed(()));
        }
    }

    #[test]
    fn element_change_triggers() {
        let mut deps = DepsTracker::new();
        assert!(deps.changed((1, "a")));
        assert!(!deps.changed((1, "a")));
        assert!(deps.changed((2, "a")));
        assert!(deps.changed((2, "b")));
        assert_eq!(deps.current(), Some(&(2, "b")));
    }

    #[test]
    fn length_change_triggers() {
        let mut deps = DepsTracker::new();
        assert!(deps.changed(vec![1, 2]));
        assert!(deps.changed(vec![1, 2, 3]));
        assert!(deps.changed(vec![1]));
        assert!(!deps.changed(vec![1]));
    }

    #[test]
    fn returning_to_an_older_list_still_triggers() {
        let mut deps = DepsTracker::new();
        assert!(deps.changed([1]));
        assert!(deps.changed([2]));
        assert!(deps.changed([1]));
    }

    #[derive(Debug)]
    struct Opaque;

    #[test]
    fn inspection_needs_no_equality() {
        let deps: DepsTracker<Opaque> = DepsTracker::default();
        assert!(!deps.is_primed());
        assert!(deps.current().is_none());
        assert_eq!(format!("{deps:?}"), "DepsTracker { last: None }");
    }
}

#![forbid(unsafe_code)]

//! Per-binding configuration.

use std::borrow::Cow;

/// Configuration for a [`FutureBinding`](crate::FutureBinding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    /// Name attached to every log event and span the binding emits.
    pub label: Cow<'static, str>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("future"),
        }
    }
}

impl BindingConfig {
    /// Config with the given label and defaults otherwise.
    pub fn labeled(label: impl Into<Cow<'static, str>>) -> Self {
        Self::default().with_label(label)
    }

    /// Set the diagnostic label.
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_label() {
        assert_eq!(BindingConfig::default().label, "future");
    }

    #[test]
    fn labeled_accepts_owned_and_static() {
        assert_eq!(BindingConfig::labeled("user-profile").label, "user-profile");
        let owned = format!("row-{}", 3);
        assert_eq!(BindingConfig::labeled(owned).label, "row-3");
    }
}

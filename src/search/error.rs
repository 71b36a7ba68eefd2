//! Error types for resource search.

use super::kind::{valid_kinds_list, ResourceKind};
use thiserror::Error;

/// Errors that cross the engine boundary.
///
/// Per-provider failures are not errors at this level: they are collected
/// as [`SearchWarning`](super::SearchWarning)s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A type filter names a kind that is not in the registry.
    #[error("invalid resource type {value:?} (valid types: {valid})")]
    InvalidKind { value: String, valid: String },

    /// Two providers were registered for the same kind.
    #[error("duplicate provider for resource type {0}")]
    DuplicateProvider(ResourceKind),

    /// The search context was canceled.
    #[error("search canceled")]
    Canceled,

    /// The search context deadline passed.
    #[error("search deadline exceeded")]
    DeadlineExceeded,

    /// Every scheduled unit failed.
    #[error("all {units} searches failed (e.g. {sample})")]
    AllFailed { units: usize, sample: String },
}

impl SearchError {
    /// Create an invalid kind error for `value`.
    pub fn invalid_kind(value: impl Into<String>) -> Self {
        Self::InvalidKind {
            value: value.into(),
            valid: valid_kinds_list(),
        }
    }

    /// True for the errors produced by a done search context.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::DeadlineExceeded)
    }
}

//! Search context
//!
//! Cancellation and deadline handle shared by the engine and every
//! provider call of one search.

use super::error::SearchError;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus an optional deadline.
///
/// Cloning is cheap and clones observe the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that is canceled when `token` is
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set a deadline `timeout` from now. An earlier existing deadline wins.
    /// Timeouts too large to represent leave the deadline unchanged.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => {
                tracing::debug!(?timeout, "Timeout out of range, ignoring");
                self
            }
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The reason this context is done, or `None` while it is still live
    pub fn err(&self) -> Option<SearchError> {
        if self.token.is_cancelled() {
            return Some(SearchError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(SearchError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Wait until the context is canceled or its deadline passes
    pub async fn done(&self) -> SearchError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => SearchError::Canceled,
                _ = tokio::time::sleep_until(deadline) => SearchError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                SearchError::Canceled
            }
        }
    }
}

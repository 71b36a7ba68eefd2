//! Provider trait
//!
//! A provider searches exactly one resource kind within one project.
//! Concrete adapters live in [`crate::resource`]; the engine only sees this
//! trait.

use super::context::SearchContext;
use super::kind::ResourceKind;
use super::model::SearchResult;
use async_trait::async_trait;

/// Searches one resource kind.
///
/// Implementations are stateless across calls, handle their own
/// pagination, and should return promptly once `ctx` is done.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The kind this provider searches
    fn kind(&self) -> ResourceKind;

    /// Find resources in `project` whose name matches `term`.
    ///
    /// Results may leave `kind` and `project` empty; the engine fills them.
    async fn fetch(
        &self,
        ctx: &SearchContext,
        project: &str,
        term: &str,
    ) -> anyhow::Result<Vec<SearchResult>>;
}

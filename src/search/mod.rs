//! Resource search engine
//!
//! Finds resources by name fragment across many projects and resource
//! kinds at once.
//!
//! # Module Structure
//!
//! - [`kind`] - The closed registry of searchable resource kinds
//! - [`query`] - Queries and `--type`/`--no-type` resolution
//! - [`provider`] - The per-kind search trait implemented by adapters
//! - [`engine`] - Bounded, failure-isolated fan-out over providers × projects
//! - [`model`] - Results, warnings and search output
//! - [`context`] - Cancellation and deadlines
//!
//! # Example
//!
//! ```ignore
//! use gcpfind::search::{Engine, Query, SearchContext};
//!
//! async fn find(engine: &Engine, projects: &[String]) -> anyhow::Result<()> {
//!     let query = Query::from_filters("piou", &["compute.instance"], &[] as &[&str])?;
//!     let output = engine
//!         .search_with_warnings(&SearchContext::new(), projects, &query)
//!         .await?;
//!     println!("{} matches", output.results.len());
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod kind;
pub mod model;
pub mod provider;
pub mod query;

pub use context::SearchContext;
pub use engine::{Engine, DEFAULT_MAX_CONCURRENT_PROJECTS};
pub use error::SearchError;
pub use kind::{is_valid_resource_kind, ResourceKind};
pub use model::{SearchOutput, SearchResult, SearchWarning};
pub use provider::Provider;
pub use query::{resolve_types, Query, TypeFilter};

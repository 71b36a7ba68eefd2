//! Search query and type filter resolution
//!
//! Turns the raw `--type` / `--no-type` lists into the set of kinds a
//! search should run against.

use super::error::SearchError;
use super::kind::ResourceKind;
use std::collections::HashSet;

/// Which resource kinds a search covers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Every registered kind, including kinds added to the registry later
    #[default]
    All,
    /// Only these kinds. May be empty, in which case nothing runs.
    Only(Vec<ResourceKind>),
}

impl TypeFilter {
    /// Check whether a kind passes the filter
    pub fn matches(&self, kind: ResourceKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(kinds) => kinds.contains(&kind),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// A single search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub term: String,
    pub types: TypeFilter,
}

impl Query {
    pub fn new(term: impl Into<String>, types: TypeFilter) -> Self {
        Self {
            term: term.into(),
            types,
        }
    }

    /// Query over every kind
    pub fn all(term: impl Into<String>) -> Self {
        Self::new(term, TypeFilter::All)
    }

    /// Build a query from raw include/exclude lists
    pub fn from_filters<I, E>(
        term: impl Into<String>,
        include: &[I],
        exclude: &[E],
    ) -> Result<Self, SearchError>
    where
        I: AsRef<str>,
        E: AsRef<str>,
    {
        Ok(Self::new(term, resolve_types(include, exclude)?))
    }
}

/// Resolve include/exclude lists into an effective [`TypeFilter`].
///
/// Exclusions are validated first so a bad `--no-type` is reported even
/// when `--type` is also wrong. A kind listed in both is dropped.
pub fn resolve_types<I, E>(include: &[I], exclude: &[E]) -> Result<TypeFilter, SearchError>
where
    I: AsRef<str>,
    E: AsRef<str>,
{
    let exclusions = parse_kinds(exclude)?;
    let excluded: HashSet<ResourceKind> = exclusions.into_iter().collect();

    if include.is_empty() {
        if excluded.is_empty() {
            return Ok(TypeFilter::All);
        }
        let remaining = ResourceKind::all()
            .iter()
            .copied()
            .filter(|k| !excluded.contains(k))
            .collect();
        return Ok(TypeFilter::Only(remaining));
    }

    let inclusions = parse_kinds(include)?;
    let remaining: Vec<ResourceKind> = inclusions
        .into_iter()
        .filter(|k| !excluded.contains(k))
        .collect();

    if remaining.is_empty() {
        tracing::debug!("Every included type is also excluded, nothing to search");
    }

    Ok(TypeFilter::Only(remaining))
}

/// Parse and dedupe a list of tags, keeping first-occurrence order
fn parse_kinds<S: AsRef<str>>(raw: &[S]) -> Result<Vec<ResourceKind>, SearchError> {
    let mut seen = HashSet::new();
    let mut kinds = Vec::with_capacity(raw.len());

    for entry in raw {
        let kind: ResourceKind = entry.as_ref().parse()?;
        if seen.insert(kind) {
            kinds.push(kind);
        }
    }

    Ok(kinds)
}

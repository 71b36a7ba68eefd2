//! Search results and warnings

use super::kind::ResourceKind;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// One matching resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Filled in by the engine from the provider's kind when absent
    #[serde(rename = "type")]
    pub kind: Option<ResourceKind>,
    pub project: String,
    /// Zone or region; empty for global resources
    pub location: String,
    pub name: String,
    /// Display-only attributes
    pub details: BTreeMap<String, String>,
}

impl SearchResult {
    pub fn new(kind: ResourceKind, project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            project: project.into(),
            location: String::new(),
            name: name.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Fill in kind and project when the provider left them empty
    pub(crate) fn stamp(&mut self, kind: ResourceKind, project: &str) {
        if self.kind.is_none() {
            self.kind = Some(kind);
        }
        if self.project.is_empty() {
            self.project = project.to_string();
        }
    }

    pub fn kind_tag(&self) -> &'static str {
        self.kind.map(|k| k.as_str()).unwrap_or("")
    }

    /// Ordering used for final output: type tag, project, name
    pub fn sort_order(&self, other: &Self) -> Ordering {
        self.kind_tag()
            .cmp(other.kind_tag())
            .then_with(|| self.project.cmp(&other.project))
            .then_with(|| self.name.cmp(&other.name))
    }

    /// Details as sorted `k=v` pairs joined by `", "`
    pub fn details_display(&self) -> String {
        self.details
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A provider that failed for one project
#[derive(Debug, Serialize)]
pub struct SearchWarning {
    pub provider: ResourceKind,
    pub project: String,
    #[serde(rename = "error", serialize_with = "serialize_error")]
    pub err: anyhow::Error,
}

impl SearchWarning {
    pub fn new(provider: ResourceKind, project: impl Into<String>, err: anyhow::Error) -> Self {
        Self {
            provider,
            project: project.into(),
            err,
        }
    }

    pub fn sort_order(&self, other: &Self) -> Ordering {
        self.provider
            .as_str()
            .cmp(other.provider.as_str())
            .then_with(|| self.project.cmp(&other.project))
    }
}

impl fmt::Display for SearchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}: {:#}", self.provider, self.project, self.err)
    }
}

fn serialize_error<S: Serializer>(err: &anyhow::Error, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{:#}", err))
}

/// Everything a search produced
#[derive(Debug, Default, Serialize)]
pub struct SearchOutput {
    pub results: Vec<SearchResult>,
    pub warnings: Vec<SearchWarning>,
    /// Number of (provider, project) units scheduled
    pub units: usize,
}

impl SearchOutput {
    /// Units that completed without error
    pub fn succeeded(&self) -> usize {
        self.units.saturating_sub(self.warnings.len())
    }

    /// True when at least one unit ran and none succeeded
    pub fn all_failed(&self) -> bool {
        self.units > 0 && self.warnings.len() >= self.units
    }

    /// Stable sort of results and warnings into output order
    pub(crate) fn sort(&mut self) {
        self.results.sort_by(SearchResult::sort_order);
        self.warnings.sort_by(SearchWarning::sort_order);
    }
}

//! Search engine
//!
//! Fans a query out over every active provider for every project and
//! collects the outcomes.
//!
//! # Execution Model
//!
//! Each project gets its own task (a "project group"). A group first takes
//! one permit from a semaphore sized to `max_concurrent_projects`, then
//! spawns one task per active provider and holds the permit until all of
//! them return. This bounds the number of projects being hit at once while
//! letting the cheap per-kind calls inside a project run side by side.
//!
//! Provider errors and panics become [`SearchWarning`]s. Only a done
//! [`SearchContext`] aborts the search.

use super::context::SearchContext;
use super::error::SearchError;
use super::kind::ResourceKind;
use super::model::{SearchOutput, SearchResult, SearchWarning};
use super::provider::Provider;
use super::query::{Query, TypeFilter};
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Default number of projects searched at the same time
pub const DEFAULT_MAX_CONCURRENT_PROJECTS: usize = 8;

/// Result of one (provider, project) unit
enum UnitOutcome {
    Matched(Vec<SearchResult>),
    Failed(SearchWarning),
}

/// Runs searches over a fixed set of providers
pub struct Engine {
    providers: Vec<Arc<dyn Provider>>,
    max_concurrent_projects: usize,
}

impl Engine {
    /// Create an engine, rejecting two providers for the same kind
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Result<Self, SearchError> {
        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.kind()) {
                return Err(SearchError::DuplicateProvider(provider.kind()));
            }
        }

        Ok(Self {
            providers,
            max_concurrent_projects: DEFAULT_MAX_CONCURRENT_PROJECTS,
        })
    }

    pub fn with_max_concurrent_projects(mut self, max: usize) -> Self {
        self.set_max_concurrent_projects(max);
        self
    }

    /// Set the project concurrency bound. Zero is clamped to one.
    pub fn set_max_concurrent_projects(&mut self, max: usize) {
        self.max_concurrent_projects = max.max(1);
    }

    pub fn max_concurrent_projects(&self) -> usize {
        self.max_concurrent_projects
    }

    /// Registered kinds, in registration order
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.providers.iter().map(|p| p.kind())
    }

    /// Search and return only the results.
    ///
    /// Warnings are dropped, except that a search in which every unit failed
    /// is reported as [`SearchError::AllFailed`].
    pub async fn search(
        &self,
        ctx: &SearchContext,
        projects: &[String],
        query: &Query,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let output = self.search_with_warnings(ctx, projects, query).await?;

        if output.all_failed() {
            let sample = output
                .warnings
                .first()
                .map(|w| w.to_string())
                .unwrap_or_default();
            return Err(SearchError::AllFailed {
                units: output.units,
                sample,
            });
        }

        Ok(output.results)
    }

    /// Search and return results together with per-unit warnings.
    ///
    /// Returns an error only if `ctx` is done before the search completes;
    /// partial results are discarded in that case.
    pub async fn search_with_warnings(
        &self,
        ctx: &SearchContext,
        projects: &[String],
        query: &Query,
    ) -> Result<SearchOutput, SearchError> {
        let active = self.active_providers(&query.types);
        let units = active.len() * projects.len();

        if units == 0 {
            tracing::debug!(
                projects = projects.len(),
                providers = active.len(),
                "Nothing to search"
            );
            return Ok(SearchOutput::default());
        }

        if let Some(err) = ctx.err() {
            return Err(err);
        }

        tracing::info!(
            term = %query.term,
            projects = projects.len(),
            providers = active.len(),
            max_concurrent_projects = self.max_concurrent_projects,
            "Starting search"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_projects));
        let term: Arc<str> = Arc::from(query.term.as_str());
        let mut groups = JoinSet::new();
        let mut group_projects = HashMap::with_capacity(projects.len());

        for project in projects {
            let handle = groups.spawn(search_project(
                Arc::clone(&semaphore),
                ctx.clone(),
                project.clone(),
                active.clone(),
                Arc::clone(&term),
            ));
            group_projects.insert(handle.id(), project.as_str());
        }

        let mut output = SearchOutput {
            units,
            ..Default::default()
        };

        loop {
            tokio::select! {
                biased;
                err = ctx.done() => {
                    groups.abort_all();
                    tracing::warn!(error = %err, "Search interrupted, discarding partial results");
                    return Err(err);
                }
                joined = groups.join_next() => match joined {
                    Some(Ok(outcomes)) => {
                        for outcome in outcomes {
                            match outcome {
                                UnitOutcome::Matched(results) => output.results.extend(results),
                                UnitOutcome::Failed(warning) => output.warnings.push(warning),
                            }
                        }
                    }
                    Some(Err(e)) => {
                        let project = group_projects.get(&e.id()).copied().unwrap_or_default();
                        tracing::error!(project, error = %e, "Project group task failed");
                        let kinds: Vec<ResourceKind> = active.iter().map(|p| p.kind()).collect();
                        output.warnings.extend(lost_units(&kinds, project, &e));
                    }
                    None => break,
                },
            }
        }

        // Groups that ran past the deadline report it as warnings; the
        // search as a whole still counts as interrupted.
        if let Some(err) = ctx.err() {
            tracing::warn!(error = %err, "Search interrupted, discarding partial results");
            return Err(err);
        }

        output.sort();

        tracing::info!(
            results = output.results.len(),
            warnings = output.warnings.len(),
            units = output.units,
            "Search complete"
        );

        Ok(output)
    }

    fn active_providers(&self, types: &TypeFilter) -> Vec<Arc<dyn Provider>> {
        self.providers
            .iter()
            .filter(|p| types.matches(p.kind()))
            .cloned()
            .collect()
    }
}

/// Run every provider against one project while holding one permit
async fn search_project(
    semaphore: Arc<Semaphore>,
    ctx: SearchContext,
    project: String,
    providers: Vec<Arc<dyn Provider>>,
    term: Arc<str>,
) -> Vec<UnitOutcome> {
    let permit = tokio::select! {
        biased;
        err = ctx.done() => return skipped(&providers, &project, err),
        permit = semaphore.acquire_owned() => permit,
    };
    let Ok(_permit) = permit else {
        return skipped(&providers, &project, SearchError::Canceled);
    };

    tracing::debug!(project = %project, providers = providers.len(), "Searching project");

    let mut outcomes = Vec::with_capacity(providers.len());
    let mut units = JoinSet::new();
    let mut unit_kinds = HashMap::with_capacity(providers.len());

    for provider in providers {
        if let Some(err) = ctx.err() {
            outcomes.push(UnitOutcome::Failed(SearchWarning::new(
                provider.kind(),
                project.as_str(),
                err.into(),
            )));
            continue;
        }

        let kind = provider.kind();
        let ctx = ctx.clone();
        let project = project.clone();
        let term = Arc::clone(&term);
        let handle = units.spawn(async move { run_unit(provider, kind, &ctx, &project, &term).await });
        unit_kinds.insert(handle.id(), kind);
    }

    while let Some(joined) = units.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                tracing::error!(project = %project, error = %e, "Provider task failed");
                let kinds: Vec<ResourceKind> = unit_kinds.get(&e.id()).copied().into_iter().collect();
                outcomes.extend(
                    lost_units(&kinds, &project, &e)
                        .into_iter()
                        .map(UnitOutcome::Failed),
                );
            }
        }
    }

    outcomes
}

/// Call one provider and turn its answer into an outcome
async fn run_unit(
    provider: Arc<dyn Provider>,
    kind: ResourceKind,
    ctx: &SearchContext,
    project: &str,
    term: &str,
) -> UnitOutcome {
    let fetched = AssertUnwindSafe(provider.fetch(ctx, project, term))
        .catch_unwind()
        .await;

    match fetched {
        Ok(Ok(mut results)) => {
            tracing::debug!(kind = %kind, project, matches = results.len(), "Provider finished");
            for result in &mut results {
                result.stamp(kind, project);
            }
            UnitOutcome::Matched(results)
        }
        Ok(Err(err)) => {
            tracing::warn!(kind = %kind, project, error = %format!("{:#}", err), "Provider failed");
            UnitOutcome::Failed(SearchWarning::new(kind, project, err))
        }
        Err(_) => {
            tracing::error!(kind = %kind, project, "Provider panicked");
            UnitOutcome::Failed(SearchWarning::new(
                kind,
                project,
                anyhow::anyhow!("provider panicked"),
            ))
        }
    }
}

/// Outcomes for a group that never got to run
fn skipped(providers: &[Arc<dyn Provider>], project: &str, err: SearchError) -> Vec<UnitOutcome> {
    providers
        .iter()
        .map(|p| UnitOutcome::Failed(SearchWarning::new(p.kind(), project, err.clone().into())))
        .collect()
}

/// Warnings for units whose task died before reporting an outcome
fn lost_units(kinds: &[ResourceKind], project: &str, err: &JoinError) -> Vec<SearchWarning> {
    let reason = if err.is_panic() {
        "search task panicked"
    } else {
        "search task was aborted"
    };
    kinds
        .iter()
        .map(|kind| SearchWarning::new(*kind, project, anyhow::anyhow!(reason)))
        .collect()
}

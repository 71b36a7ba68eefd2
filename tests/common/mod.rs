//! Test doubles for the search engine

#![allow(dead_code)]

use async_trait::async_trait;
use gcpfind::search::{Provider, ResourceKind, SearchContext, SearchResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Provider with canned answers per project.
/// Projects without an answer return no matches.
pub struct StaticProvider {
    kind: ResourceKind,
    answers: HashMap<String, Result<Vec<SearchResult>, String>>,
    calls: Mutex<Vec<String>>,
}

impl StaticProvider {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            answers: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `project` with results named after `names`, kind/project left for the engine
    pub fn with_matches(mut self, project: &str, names: &[&str]) -> Self {
        let results = names
            .iter()
            .map(|name| SearchResult {
                kind: None,
                project: String::new(),
                location: "us-central1-a".to_string(),
                name: name.to_string(),
                details: Default::default(),
            })
            .collect();
        self.answers.insert(project.to_string(), Ok(results));
        self
    }

    pub fn with_results(mut self, project: &str, results: Vec<SearchResult>) -> Self {
        self.answers.insert(project.to_string(), Ok(results));
        self
    }

    pub fn failing_for(mut self, project: &str, message: &str) -> Self {
        self.answers
            .insert(project.to_string(), Err(message.to_string()));
        self
    }

    /// Projects this provider was called for, sorted
    pub fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn fetch(
        &self,
        _ctx: &SearchContext,
        project: &str,
        _term: &str,
    ) -> anyhow::Result<Vec<SearchResult>> {
        self.calls.lock().unwrap().push(project.to_string());
        match self.answers.get(project) {
            Some(Ok(results)) => Ok(results.clone()),
            Some(Err(message)) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(vec![]),
        }
    }
}

/// Provider that blocks in `fetch` until the test releases it,
/// tracking how many calls are in flight
pub struct GatedProvider {
    kind: ResourceKind,
    gate: Semaphore,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl GatedProvider {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            gate: Semaphore::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Wait until exactly `n` calls are blocked in `fetch`
    pub async fn wait_for_in_flight(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.in_flight() != n {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("in-flight count never reached");
    }
}

#[async_trait]
impl Provider for GatedProvider {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn fetch(
        &self,
        _ctx: &SearchContext,
        project: &str,
        _term: &str,
    ) -> anyhow::Result<Vec<SearchResult>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let permit = self.gate.acquire().await;
        if let Ok(permit) = permit {
            permit.forget();
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(vec![SearchResult::new(self.kind, project, format!("{}-match", project))])
    }
}

/// Provider that never returns and ignores cancellation
pub struct HangingProvider {
    kind: ResourceKind,
}

impl HangingProvider {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Provider for HangingProvider {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn fetch(
        &self,
        _ctx: &SearchContext,
        _project: &str,
        _term: &str,
    ) -> anyhow::Result<Vec<SearchResult>> {
        std::future::pending::<()>().await;
        Ok(vec![])
    }
}

/// Provider that panics
pub struct PanickingProvider {
    kind: ResourceKind,
}

impl PanickingProvider {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Provider for PanickingProvider {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn fetch(
        &self,
        _ctx: &SearchContext,
        _project: &str,
        _term: &str,
    ) -> anyhow::Result<Vec<SearchResult>> {
        panic!("provider bug");
    }
}

/// One static provider per registry kind, each matching "<kind>-<project>"
pub fn full_registry(projects: &[&str]) -> Vec<Arc<StaticProvider>> {
    ResourceKind::all()
        .iter()
        .map(|kind| {
            let mut provider = StaticProvider::new(*kind);
            for project in projects {
                let name = format!("{}-{}", kind.as_str(), project);
                provider = provider.with_matches(project, &[name.as_str()]);
            }
            Arc::new(provider)
        })
        .collect()
}

pub fn as_dyn<P: Provider + 'static>(providers: &[Arc<P>]) -> Vec<Arc<dyn Provider>> {
    providers
        .iter()
        .map(|p| Arc::clone(p) as Arc<dyn Provider>)
        .collect()
}

pub fn projects(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Provider that blocks its worker thread for `delay` before answering
pub struct BlockingProvider {
    kind: ResourceKind,
    delay: Duration,
}

impl BlockingProvider {
    pub fn new(kind: ResourceKind, delay: Duration) -> Self {
        Self { kind, delay }
    }
}

#[async_trait]
impl Provider for BlockingProvider {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn fetch(
        &self,
        _ctx: &SearchContext,
        project: &str,
        _term: &str,
    ) -> anyhow::Result<Vec<SearchResult>> {
        std::thread::sleep(self.delay);
        Ok(vec![SearchResult::new(self.kind, project, format!("{}-slow", project))])
    }
}

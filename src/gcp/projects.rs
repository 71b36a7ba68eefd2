//! GCP Projects
//!
//! Listing accessible projects and the on-disk project cache that supplies
//! the default project list for searches.

use super::auth::validate_project_id;
use super::client::{add_query_params, next_page_token, GcpClient};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Project information
#[derive(Debug, Clone)]
pub struct Project {
    pub project_id: String,
    pub lifecycle_state: String,
}

impl From<&Value> for Project {
    fn from(value: &Value) -> Self {
        Self {
            project_id: value
                .get("projectId")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            lifecycle_state: value
                .get("lifecycleState")
                .and_then(|v| v.as_str())
                .unwrap_or("UNKNOWN")
                .to_string(),
        }
    }
}

/// List all accessible, active GCP projects
pub async fn list_projects(client: &GcpClient) -> Result<Vec<Project>> {
    let base_url = client.resourcemanager_url("projects");
    let mut projects = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let params: Vec<(String, String)> = page_token
            .iter()
            .map(|t| ("pageToken".to_string(), t.clone()))
            .collect();
        let response = client
            .get(&add_query_params(&base_url, &params))
            .await
            .context("Failed to list projects")?;

        if let Some(items) = response.get("projects").and_then(|v| v.as_array()) {
            projects.extend(
                items
                    .iter()
                    .map(Project::from)
                    .filter(|p| p.lifecycle_state == "ACTIVE"),
            );
        }

        page_token = next_page_token(&response, page_token.as_deref())
            .context("Failed to list projects")?;

        if page_token.is_none() {
            break;
        }
    }

    Ok(projects)
}

/// Get project IDs as a sorted list
pub async fn list_project_ids(client: &GcpClient) -> Result<Vec<String>> {
    let mut ids: Vec<String> = list_projects(client)
        .await?
        .into_iter()
        .map(|p| p.project_id)
        .collect();
    ids.sort();
    ids.dedup();
    Ok(ids)
}

/// Reject project IDs that are not well formed. They end up in URL paths.
pub fn check_project_ids(projects: &[String]) -> Result<()> {
    let invalid: Vec<&str> = projects
        .iter()
        .map(String::as_str)
        .filter(|p| !validate_project_id(p))
        .collect();

    if !invalid.is_empty() {
        anyhow::bail!("Invalid project ID(s): {}", invalid.join(", "));
    }
    Ok(())
}

/// Drop malformed project IDs from a stored or listed project set
pub fn searchable_projects(projects: Vec<String>) -> Vec<String> {
    projects
        .into_iter()
        .filter(|p| {
            let valid = validate_project_id(p);
            if !valid {
                tracing::warn!("Skipping project with unsupported ID {:?}", p);
            }
            valid
        })
        .collect()
}

/// Locally cached project list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCache {
    pub updated_at: DateTime<Utc>,
    pub projects: Vec<String>,
}

impl ProjectCache {
    pub fn new(projects: Vec<String>) -> Self {
        Self {
            updated_at: Utc::now(),
            projects,
        }
    }

    /// Default cache file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("gcpfind").join("projects.json"))
    }

    /// Load the cache from the default path
    pub fn load() -> Option<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load a cache file. Missing or unreadable files yield `None`.
    pub fn load_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!("Ignoring corrupt project cache {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save the cache to the default path
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::default_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Fetch the project list from Resource Manager and store it
    pub async fn refresh(client: &GcpClient) -> Result<Self> {
        let projects = list_project_ids(client).await?;
        tracing::info!("Refreshed project cache with {} projects", projects.len());
        let cache = Self::new(projects);
        if let Err(e) = cache.save() {
            tracing::warn!("Failed to write project cache: {:#}", e);
        }
        Ok(cache)
    }
}

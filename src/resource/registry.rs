//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads the REST definition of every searchable resource kind
//! from embedded JSON files and provides lookup functions for the providers.

use crate::gcp::client::Service;
use crate::search::ResourceKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/compute.json"),
    include_str!("../resources/storage.json"),
    include_str!("../resources/gke.json"),
    include_str!("../resources/managed.json"),
];

/// Child collection nested inside each listed item
#[derive(Debug, Clone, Deserialize)]
pub struct NestedDef {
    /// Array field on the parent holding the children
    pub field: String,
    /// Field added to every child holding the parent's name
    pub parent_label: String,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub service: Service,
    /// Path under the service root; `{project}` is substituted
    pub path: String,
    /// Extra query parameters; values may contain `{project}`
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// Compute aggregatedList response (items keyed by zone/region)
    #[serde(default)]
    pub aggregated: bool,
    pub response_path: String,
    #[serde(default)]
    pub nested: Option<NestedDef>,
    #[serde(default = "default_name_field")]
    pub name_field: String,
    /// Candidate fields for the location, first present wins
    #[serde(default)]
    pub location_fields: Vec<String>,
    /// Detail label -> dot path into the item
    #[serde(default)]
    pub details: HashMap<String, String>,
}

fn default_name_field() -> String {
    "name".to_string()
}

impl ResourceDef {
    /// List path for a project
    pub fn project_path(&self, project: &str) -> String {
        self.path.replace("{project}", project)
    }

    /// Query parameters for a project, sorted by key for stable URLs
    pub fn project_params(&self, project: &str) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.replace("{project}", project)))
            .collect();
        params.sort();
        params
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
struct ResourceConfig {
    #[serde(default)]
    resources: HashMap<ResourceKind, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<HashMap<ResourceKind, ResourceDef>> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static HashMap<ResourceKind, ResourceDef> {
    REGISTRY.get_or_init(|| {
        let mut resources = HashMap::new();

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            resources.extend(partial.resources);
        }

        resources
    })
}

/// Get the definition for a kind
pub fn get_resource(kind: ResourceKind) -> Option<&'static ResourceDef> {
    get_registry().get(&kind)
}

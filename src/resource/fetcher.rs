//! Resource Fetcher
//!
//! A [`Provider`] backed by a REST list call described by a
//! [`ResourceDef`]. Handles pagination, aggregated and nested responses,
//! and maps matching items to search results.

use super::registry::{get_resource, ResourceDef};
use crate::gcp::client::{add_query_params, next_page_token, GcpClient};
use crate::search::{Provider, ResourceKind, SearchContext, SearchResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Provider for one resource kind over the GCP REST API
pub struct RestProvider {
    kind: ResourceKind,
    def: &'static ResourceDef,
    client: GcpClient,
}

impl RestProvider {
    pub fn new(kind: ResourceKind, client: GcpClient) -> Result<Self> {
        let def = get_resource(kind)
            .ok_or_else(|| anyhow::anyhow!("No REST definition for resource type {}", kind))?;
        Ok(Self { kind, def, client })
    }

    /// Fetch every page of the list call
    async fn fetch_all(&self, project: &str) -> Result<Vec<Value>> {
        let url = self
            .client
            .service_url(self.def.service, &self.def.project_path(project));
        let base_params = self.def.project_params(project);

        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = base_params.clone();
            if let Some(token) = &page_token {
                params.push(("pageToken".to_string(), token.clone()));
            }

            let response = self.client.get(&add_query_params(&url, &params)).await?;
            all_items.extend(extract_items(&response, self.def));

            page_token = next_page_token(&response, page_token.as_deref())?;

            if page_token.is_none() {
                break;
            }
        }

        Ok(all_items)
    }
}

#[async_trait]
impl Provider for RestProvider {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn fetch(
        &self,
        ctx: &SearchContext,
        project: &str,
        term: &str,
    ) -> Result<Vec<SearchResult>> {
        let items = tokio::select! {
            err = ctx.done() => return Err(err.into()),
            items = self.fetch_all(project) => {
                items.with_context(|| format!("Failed to list {}", self.kind.display_name()))?
            }
        };

        let needle = term.to_lowercase();
        Ok(items
            .iter()
            .filter_map(|item| to_result(item, self.def, self.kind, project))
            .filter(|result| result.name.to_lowercase().contains(&needle))
            .collect())
    }
}

/// Build one provider per kind, in registry order
pub fn build_providers(client: &GcpClient) -> Result<Vec<Arc<dyn Provider>>> {
    ResourceKind::all()
        .iter()
        .map(|kind| {
            let provider = RestProvider::new(*kind, client.clone())?;
            Ok(Arc::new(provider) as Arc<dyn Provider>)
        })
        .collect()
}

/// Extract items from a response following the definition's shape
fn extract_items(response: &Value, def: &ResourceDef) -> Vec<Value> {
    let mut current = response;
    for part in def.response_path.split('.').filter(|p| !p.is_empty()) {
        current = match current.get(part) {
            Some(v) => v,
            None => return vec![],
        };
    }

    let items = if def.aggregated {
        flatten_aggregated(current)
    } else {
        current.as_array().cloned().unwrap_or_default()
    };

    match &def.nested {
        Some(nested) => items
            .iter()
            .flat_map(|parent| expand_nested(parent, &nested.field, &nested.parent_label, def))
            .collect(),
        None => items,
    }
}

/// Flatten an aggregated list.
/// Aggregated responses look like { "zones/us-central1-a": { "instances": [...] }, ... }
fn flatten_aggregated(scopes: &Value) -> Vec<Value> {
    let Some(scopes) = scopes.as_object() else {
        return vec![];
    };

    let mut all_items = Vec::new();
    for scope in scopes.values() {
        let Some(obj) = scope.as_object() else {
            continue;
        };
        for (key, value) in obj {
            // Scopes with nothing in them only carry a "warning"
            if key == "warning" {
                continue;
            }
            if let Some(arr) = value.as_array() {
                all_items.extend(arr.iter().cloned());
            }
        }
    }
    all_items
}

/// Turn a parent into its children, labelling each with the parent's name
/// and inheriting the parent's location fields when missing
fn expand_nested(parent: &Value, field: &str, parent_label: &str, def: &ResourceDef) -> Vec<Value> {
    let Some(children) = parent.get(field).and_then(|v| v.as_array()) else {
        return vec![];
    };
    let parent_name = parent.get(&def.name_field).cloned().unwrap_or(Value::Null);

    children
        .iter()
        .cloned()
        .map(|mut child| {
            if let Value::Object(ref mut map) = child {
                map.insert(parent_label.to_string(), parent_name.clone());
                for location_field in &def.location_fields {
                    if !map.contains_key(location_field) {
                        if let Some(value) = parent.get(location_field) {
                            map.insert(location_field.clone(), value.clone());
                        }
                    }
                }
            }
            child
        })
        .collect()
}

/// Map one API item to a search result. Items without a name are skipped.
fn to_result(
    item: &Value,
    def: &ResourceDef,
    kind: ResourceKind,
    project: &str,
) -> Option<SearchResult> {
    let full_name = item.get(&def.name_field)?.as_str()?;
    let name = extract_short_name(full_name);

    let location = def
        .location_fields
        .iter()
        .find_map(|field| item.get(field).and_then(|v| v.as_str()))
        .map(extract_short_name)
        .or_else(|| location_from_resource_name(full_name))
        .unwrap_or_default();

    let mut result = SearchResult::new(kind, project, name).with_location(location);
    for (label, path) in &def.details {
        if let Some(value) = extract_json_value(item, path) {
            result.details.insert(label.clone(), value);
        }
    }

    Some(result)
}

/// Extract short name from GCP resource URL or resource name
/// e.g., "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-a" -> "us-central1-a"
fn extract_short_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

/// Location segment of a resource name like "projects/p/locations/europe-west1/services/s"
fn location_from_resource_name(name: &str) -> Option<String> {
    let mut parts = name.split('/');
    while let Some(part) = parts.next() {
        if matches!(part, "locations" | "zones" | "regions") {
            return parts.next().map(|s| s.to_string());
        }
    }
    None
}

/// Extract a display value from JSON using a dot-notation path.
/// Google API self links are shortened to their last segment; missing values are `None`.
pub fn extract_json_value(item: &Value, path: &str) -> Option<String> {
    let mut current = item;

    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(idx) => current.get(idx)?,
            Err(_) => current.get(part)?,
        };
    }

    match current {
        Value::String(s) if s.contains("googleapis.com/") => Some(extract_short_name(s)),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Array(arr) => Some(format!("[{} items]", arr.len())),
        Value::Object(_) => None,
    }
}

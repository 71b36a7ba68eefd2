//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication,
//! HTTP functionality and per-service endpoint roots.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// GCP REST services used by the resource definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Compute,
    Storage,
    Container,
    Sqladmin,
    Run,
    Secretmanager,
    Resourcemanager,
}

impl Service {
    /// Production API root
    fn default_root(&self) -> &'static str {
        match self {
            Self::Compute => "https://compute.googleapis.com/compute/v1",
            Self::Storage => "https://storage.googleapis.com/storage/v1",
            Self::Container => "https://container.googleapis.com/v1",
            Self::Sqladmin => "https://sqladmin.googleapis.com/v1",
            Self::Run => "https://run.googleapis.com/v2",
            Self::Secretmanager => "https://secretmanager.googleapis.com/v1",
            Self::Resourcemanager => "https://cloudresourcemanager.googleapis.com/v1",
        }
    }

    /// Path prefix used when every service shares one base URL
    fn path_prefix(&self) -> &'static str {
        match self {
            Self::Compute => "compute/v1",
            Self::Storage => "storage/v1",
            Self::Container => "container/v1",
            Self::Sqladmin => "sqladmin/v1",
            Self::Run => "run/v2",
            Self::Secretmanager => "secretmanager/v1",
            Self::Resourcemanager => "resourcemanager/v1",
        }
    }
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    /// When set, every service is served from `{base_url}/{prefix}`
    base_url: Option<String>,
}

impl GcpClient {
    /// Create a new GCP client
    pub async fn new() -> Result<Self> {
        let credentials = GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?;

        let http = GcpHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            base_url: None,
        })
    }

    /// Client with explicit credentials and a single base URL for all services
    pub fn with_base_url(credentials: GcpCredentials, base_url: &str) -> Result<Self> {
        Ok(Self {
            credentials,
            http: GcpHttpClient::new()?,
            base_url: Some(base_url.trim_end_matches('/').to_string()),
        })
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    /// Build a URL for `path` under a service root
    pub fn service_url(&self, service: Service, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match &self.base_url {
            Some(base) => format!("{}/{}/{}", base, service.path_prefix(), path),
            None => format!("{}/{}", service.default_root(), path),
        }
    }

    /// Build Resource Manager API URL
    pub fn resourcemanager_url(&self, path: &str) -> String {
        self.service_url(Service::Resourcemanager, path)
    }
}

/// Read `nextPageToken` from a list response.
/// A token equal to the one just sent is an error, so a misbehaving API
/// cannot keep a listing going forever.
pub fn next_page_token(response: &Value, previous: Option<&str>) -> Result<Option<String>> {
    let token = response
        .get("nextPageToken")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());

    match token {
        Some(token) if Some(token) == previous => {
            anyhow::bail!("API returned the same page token twice ({})", token)
        }
        Some(token) => Ok(Some(token.to_string())),
        None => Ok(None),
    }
}

/// Append query parameters to a URL, percent-encoding values
pub fn add_query_params(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    if url.contains('?') {
        format!("{}&{}", url, query)
    } else {
        format!("{}?{}", url, query)
    }
}

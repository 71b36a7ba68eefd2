//! Resource abstraction layer
//!
//! This module provides a data-driven approach to searching GCP resources.
//! Resource definitions are loaded from JSON files at compile time, so one
//! generic provider covers every resource kind.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`fetcher`] - REST provider with pagination and response flattening
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `compute.json` - Compute Engine resources (VMs, disks, networks, load balancing, VPN)
//! - `storage.json` - Cloud Storage buckets
//! - `gke.json` - GKE clusters and node pools
//! - `managed.json` - Cloud SQL, Cloud Run and Secret Manager
//!
//! # Example
//!
//! ```ignore
//! use gcpfind::resource::build_providers;
//! use gcpfind::search::Engine;
//!
//! async fn engine(client: &GcpClient) -> anyhow::Result<Engine> {
//!     Ok(Engine::new(build_providers(client)?)?)
//! }
//! ```

mod fetcher;
mod registry;

pub use fetcher::{build_providers, extract_json_value, RestProvider};
pub use registry::{get_registry, get_resource, NestedDef, ResourceDef};

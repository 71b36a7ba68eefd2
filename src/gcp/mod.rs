//! GCP API interaction module
//!
//! This module provides the core functionality for interacting with Google Cloud Platform
//! APIs, including authentication, HTTP client, and project management.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication using Application Default Credentials
//! - [`client`] - Main GCP client and per-service endpoint roots
//! - [`http`] - HTTP utilities for REST API calls
//! - [`projects`] - Project listing and the local project cache
//!
//! # Example
//!
//! ```ignore
//! use gcpfind::gcp::client::{GcpClient, Service};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new().await?;
//!     let url = client.service_url(Service::Compute, "projects/my-project/global/networks");
//!     let networks = client.get(&url).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod projects;

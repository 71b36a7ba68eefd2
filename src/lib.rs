//! gcpfind - find GCP resources by name across projects
//!
//! The [`search`] engine fans a name query out over every resource kind and
//! project, in parallel and with per-project concurrency limits. The
//! [`resource`] module provides REST-backed providers for it, [`gcp`] the
//! API plumbing.

pub mod config;
pub mod gcp;
pub mod output;
pub mod resource;
pub mod search;

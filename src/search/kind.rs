//! Resource kind registry
//!
//! The closed set of resource categories the search engine knows about.
//! Tags double as filter values (`--type compute.instance`) and as result
//! labels, so their spelling is part of the CLI surface.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A searchable category of GCP resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ResourceKind {
    Instance,
    InstanceGroupManager,
    InstanceTemplate,
    Address,
    Disk,
    Snapshot,
    Bucket,
    ForwardingRule,
    BackendService,
    TargetPool,
    HealthCheck,
    UrlMap,
    SqlInstance,
    GkeCluster,
    GkeNodePool,
    Network,
    Subnetwork,
    CloudRunService,
    Firewall,
    Secret,
    VpnGateway,
    VpnTunnel,
}

/// Every kind, in registry order
const ALL_KINDS: [ResourceKind; 22] = [
    ResourceKind::Instance,
    ResourceKind::InstanceGroupManager,
    ResourceKind::InstanceTemplate,
    ResourceKind::Address,
    ResourceKind::Disk,
    ResourceKind::Snapshot,
    ResourceKind::Bucket,
    ResourceKind::ForwardingRule,
    ResourceKind::BackendService,
    ResourceKind::TargetPool,
    ResourceKind::HealthCheck,
    ResourceKind::UrlMap,
    ResourceKind::SqlInstance,
    ResourceKind::GkeCluster,
    ResourceKind::GkeNodePool,
    ResourceKind::Network,
    ResourceKind::Subnetwork,
    ResourceKind::CloudRunService,
    ResourceKind::Firewall,
    ResourceKind::Secret,
    ResourceKind::VpnGateway,
    ResourceKind::VpnTunnel,
];

impl ResourceKind {
    /// All kinds in registry order
    pub fn all() -> &'static [ResourceKind] {
        &ALL_KINDS
    }

    /// The tag used on the command line and in output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instance => "compute.instance",
            Self::InstanceGroupManager => "compute.instanceGroupManager",
            Self::InstanceTemplate => "compute.instanceTemplate",
            Self::Address => "compute.address",
            Self::Disk => "compute.disk",
            Self::Snapshot => "compute.snapshot",
            Self::Bucket => "storage.bucket",
            Self::ForwardingRule => "compute.forwardingRule",
            Self::BackendService => "compute.backendService",
            Self::TargetPool => "compute.targetPool",
            Self::HealthCheck => "compute.healthCheck",
            Self::UrlMap => "compute.urlMap",
            Self::SqlInstance => "sqladmin.instance",
            Self::GkeCluster => "container.cluster",
            Self::GkeNodePool => "container.nodePool",
            Self::Network => "compute.network",
            Self::Subnetwork => "compute.subnetwork",
            Self::CloudRunService => "run.service",
            Self::Firewall => "compute.firewall",
            Self::Secret => "secretmanager.secret",
            Self::VpnGateway => "compute.vpnGateway",
            Self::VpnTunnel => "compute.vpnTunnel",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Instance => "VM Instances",
            Self::InstanceGroupManager => "Managed Instance Groups",
            Self::InstanceTemplate => "Instance Templates",
            Self::Address => "IP Addresses",
            Self::Disk => "Persistent Disks",
            Self::Snapshot => "Disk Snapshots",
            Self::Bucket => "Storage Buckets",
            Self::ForwardingRule => "Forwarding Rules",
            Self::BackendService => "Backend Services",
            Self::TargetPool => "Target Pools",
            Self::HealthCheck => "Health Checks",
            Self::UrlMap => "URL Maps",
            Self::SqlInstance => "Cloud SQL Instances",
            Self::GkeCluster => "GKE Clusters",
            Self::GkeNodePool => "GKE Node Pools",
            Self::Network => "VPC Networks",
            Self::Subnetwork => "Subnets",
            Self::CloudRunService => "Cloud Run Services",
            Self::Firewall => "Firewall Rules",
            Self::Secret => "Secrets",
            Self::VpnGateway => "VPN Gateways",
            Self::VpnTunnel => "VPN Tunnels",
        }
    }

    /// Look up a kind by its tag (exact match, no trimming)
    pub fn from_tag(tag: &str) -> Option<Self> {
        ALL_KINDS.iter().copied().find(|k| k.as_str() == tag)
    }
}

/// Check whether a string names a known resource kind
pub fn is_valid_resource_kind(candidate: &str) -> bool {
    ResourceKind::from_tag(candidate).is_some()
}

/// Comma separated list of every tag, for error messages
pub fn valid_kinds_list() -> String {
    ALL_KINDS
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = super::SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_tag(trimmed).ok_or_else(|| super::SearchError::invalid_kind(trimmed))
    }
}

impl TryFrom<String> for ResourceKind {
    type Error = super::SearchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceKind> for &'static str {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str()
    }
}

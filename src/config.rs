//! Configuration Management
//!
//! Handles persistent configuration storage for gcpfind.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Projects to search when none are given on the command line
    #[serde(default)]
    pub projects: Option<Vec<String>>,
    /// Projects searched at the same time
    #[serde(default)]
    pub parallelism: Option<usize>,
    /// Deadline for a whole search, in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcpfind").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from a specific file. Missing or invalid files give defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get effective parallelism (CLI > config > engine default)
    pub fn effective_parallelism(&self, cli: Option<usize>) -> Option<usize> {
        cli.or(self.parallelism)
    }

    /// Get effective search timeout (CLI > config > none)
    pub fn effective_timeout(&self, cli_secs: Option<u64>) -> Option<Duration> {
        cli_secs
            .or(self.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Configured project list, if any non-empty one is set
    pub fn configured_projects(&self) -> Option<&[String]> {
        self.projects.as_deref().filter(|p| !p.is_empty())
    }
}

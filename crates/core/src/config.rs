use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::boundary::{BoundaryRules, DEFAULT_BUILD_DESCRIPTORS};

/// Serializable scan configuration, conventionally stored as `svcmap.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Name given to the system root.
    pub system_name: String,
    /// File names that mark a service boundary.
    #[serde(default = "default_build_descriptors")]
    pub build_descriptors: Vec<String>,
    /// Extensions (without the dot) of files recorded as config files.
    #[serde(default = "default_config_extensions")]
    pub config_extensions: Vec<String>,
    /// Exact file names recorded as config files.
    #[serde(default = "default_config_file_names")]
    pub config_file_names: Vec<String>,
    /// Directory names never descended during a scan.
    #[serde(default = "default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_build_descriptors() -> Vec<String> {
    strings(&DEFAULT_BUILD_DESCRIPTORS)
}

fn default_config_extensions() -> Vec<String> {
    strings(&["yml", "yaml"])
}

fn default_config_file_names() -> Vec<String> {
    strings(&["Dockerfile", "pom.xml", "build.gradle"])
}

fn default_ignored_dirs() -> Vec<String> {
    strings(&[".git", "target", "build", "node_modules", ".idea"])
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new("system")
    }
}

impl ScanConfig {
    pub fn new(system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            build_descriptors: default_build_descriptors(),
            config_extensions: default_config_extensions(),
            config_file_names: default_config_file_names(),
            ignored_dirs: default_ignored_dirs(),
        }
    }

    /// Boundary rules implied by the configured descriptor names.
    pub fn rules(&self) -> BoundaryRules {
        BoundaryRules::new(self.build_descriptors.iter().cloned())
    }
}

/// Load a scan config JSON from disk.
pub fn load_scan_config(path: &Path) -> Result<ScanConfig> {
    let config_json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scan config at {}", path.display()))?;
    let config: ScanConfig = serde_json::from_str(&config_json)
        .with_context(|| format!("Failed to parse scan config at {}", path.display()))?;
    Ok(config)
}

//! Service boundary resolution.
//!
//! A service boundary is a directory that directly contains a build descriptor.
//! When boundaries nest, the more specific (deeper) one wins: a nested module is
//! the real service, not its parent.

pub mod discovery;
pub mod paths;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::model::ProjectFile;

pub use discovery::discover_roots;
pub use paths::{file_name, is_strictly_under, is_under, normalize_path, parent_dir};

/// Descriptor file names recognized when none are configured.
pub const DEFAULT_BUILD_DESCRIPTORS: [&str; 2] = ["pom.xml", "build.gradle"];

/// Name used when neither the descriptor nor the directory yields one.
pub const UNKNOWN_SERVICE: &str = "unknown-service";

/// Which files mark a service boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryRules {
    descriptor_names: Vec<String>,
}

impl Default for BoundaryRules {
    fn default() -> Self {
        Self::new(DEFAULT_BUILD_DESCRIPTORS.iter().map(|s| s.to_string()))
    }
}

impl BoundaryRules {
    pub fn new(descriptor_names: impl IntoIterator<Item = String>) -> Self {
        Self { descriptor_names: descriptor_names.into_iter().collect() }
    }

    pub fn descriptor_names(&self) -> &[String] {
        &self.descriptor_names
    }

    /// True when the path's file name is a build descriptor.
    pub fn is_descriptor(&self, path: &str) -> bool {
        let name = file_name(path);
        self.descriptor_names.iter().any(|d| d == name)
    }

    /// Root directory marked by a descriptor path, or `None` if it is not one.
    pub fn descriptor_root(&self, path: &str) -> Option<String> {
        if self.is_descriptor(path) {
            Some(parent_dir(path))
        } else {
            None
        }
    }
}

/// Reduce candidate roots to a pairwise non-overlapping set.
///
/// Whenever one candidate lies strictly under another, the shorter one is
/// discarded. Names travel with their roots.
pub fn resolve_roots(candidates: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let roots: Vec<String> = candidates.keys().cloned().collect();
    candidates
        .into_iter()
        .filter(|(root, _)| !roots.iter().any(|other| is_strictly_under(other, root)))
        .collect()
}

/// Directory-name fallback for a service name.
pub fn fallback_service_name(root: &str) -> String {
    let name = file_name(root);
    if name.is_empty() {
        UNKNOWN_SERVICE.to_string()
    } else {
        name.to_string()
    }
}

/// Service name declared inside a descriptor payload, if any.
///
/// Maven descriptors normalized to JSON carry it as `project.artifactId`.
pub fn declared_service_name(file: &ProjectFile) -> Option<String> {
    let data = &file.as_config()?.data;
    match data.pointer("/project/artifactId") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

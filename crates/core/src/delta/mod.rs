//! File-level changes between two commits.
//!
//! A [`SystemChange`] is the unit consumed by the merge engine: the commit the
//! changes were computed against, the commit they lead to, and the ordered list
//! of per-file [`Delta`]s.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::boundary::normalize_path;
use crate::model::ProjectFile;

/// Placeholder git uses for the missing side of an add or delete.
pub const GIT_NULL_PATH: &str = "/dev/null";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
}

/// One file-level change.
///
/// `old_path` is absent on ADD, `new_path` is absent on DELETE. `data` is the
/// parsed new-state payload; it is null on DELETE and may be null or empty when
/// upstream parsing failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    #[serde(default, deserialize_with = "deserialize_git_path", skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_git_path", skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

fn deserialize_git_path<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|p| {
        let trimmed = p.trim();
        if trimmed.is_empty() || trimmed == GIT_NULL_PATH {
            None
        } else {
            Some(normalize_path(trimmed))
        }
    }))
}

impl Delta {
    pub fn add(new_path: &str, data: Value) -> Self {
        Self { old_path: None, new_path: Some(normalize_path(new_path)), change_type: ChangeType::Add, data }
    }

    pub fn modify(old_path: &str, new_path: &str, data: Value) -> Self {
        Self {
            old_path: Some(normalize_path(old_path)),
            new_path: Some(normalize_path(new_path)),
            change_type: ChangeType::Modify,
            data,
        }
    }

    pub fn delete(old_path: &str) -> Self {
        Self { old_path: Some(normalize_path(old_path)), new_path: None, change_type: ChangeType::Delete, data: Value::Null }
    }

    /// Path the change leaves behind: the new path, or the old one for deletes.
    pub fn path(&self) -> Option<&str> {
        self.new_path.as_deref().or(self.old_path.as_deref())
    }

    /// Decode the new-state payload into a file stored at `new_path`.
    ///
    /// Returns `None` when the payload is missing or failed upstream parsing.
    /// The delta's own path wins over whatever path the payload carries.
    pub fn payload(&self) -> Option<ProjectFile> {
        let mut file = ProjectFile::from_payload(&self.data)?;
        match &self.new_path {
            Some(path) => file.set_path(path.clone()),
            None if file.path().is_empty() => return None,
            None => {
                let normalized = normalize_path(file.path());
                file.set_path(normalized);
            }
        }
        Some(file)
    }
}

/// All changes between two commits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemChange {
    #[serde(default)]
    pub old_commit: String,
    #[serde(default)]
    pub new_commit: String,
    #[serde(default, deserialize_with = "deserialize_changes")]
    pub changes: Vec<Delta>,
}

fn deserialize_changes<'de, D>(deserializer: D) -> Result<Vec<Delta>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Delta>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SystemChange {
    pub fn new(old_commit: impl Into<String>, new_commit: impl Into<String>, changes: Vec<Delta>) -> Self {
        Self { old_commit: old_commit.into(), new_commit: new_commit.into(), changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

//! Reading and writing system snapshots and change sets.
//!
//! Any problem with a whole document is fatal: nothing is partially loaded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::delta::SystemChange;
use crate::model::System;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed document at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type DocumentResult<T> = Result<T, DocumentError>;

fn read_document<T: DeserializeOwned>(path: &Path) -> DocumentResult<T> {
    let text = fs::read_to_string(path).map_err(|source| DocumentError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text).map_err(|source| DocumentError::Parse { path: path.to_path_buf(), source })
}

fn write_document<T: Serialize>(path: &Path, value: &T) -> DocumentResult<()> {
    let text =
        serde_json::to_string_pretty(value).map_err(|source| DocumentError::Parse { path: path.to_path_buf(), source })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DocumentError::Io { path: parent.to_path_buf(), source })?;
    }
    fs::write(path, text).map_err(|source| DocumentError::Io { path: path.to_path_buf(), source })
}

/// Load a system snapshot, rebuilding the arena and owner index.
///
/// Duplicate paths or overlapping service roots surface as `Parse` errors.
pub fn load_system(path: &Path) -> DocumentResult<System> {
    read_document(path)
}

pub fn save_system(path: &Path, system: &System) -> DocumentResult<()> {
    write_document(path, system)
}

pub fn load_change(path: &Path) -> DocumentResult<SystemChange> {
    read_document(path)
}

pub fn save_change(path: &Path, change: &SystemChange) -> DocumentResult<()> {
    write_document(path, change)
}

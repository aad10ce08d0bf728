pub mod commands;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use svcmap_core::config::{load_scan_config, ScanConfig};

/// Conventional config file name looked up at the repository root.
pub const DEFAULT_CONFIG_FILE: &str = "svcmap.json";

/// Initialize stderr logging. `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .try_init();
}

/// Canonicalize the root path if possible, falling back to the given string
/// relative to the current working directory.
pub fn canonicalize_or_current(root: &str) -> Result<PathBuf> {
    let path = Path::new(root);
    if path == Path::new(".") {
        Ok(env::current_dir().context("Failed to get current directory")?)
    } else {
        match path.canonicalize() {
            Ok(p) => Ok(p),
            Err(_) => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                Ok(cwd.join(path))
            }
        }
    }
}

/// Infer a system name from the repository root.
///
/// If the root has no final component (e.g., `/`), fallback to `unnamed-system`.
pub fn infer_system_name(root: &Path) -> String {
    root.file_name().and_then(|os_str| os_str.to_str()).unwrap_or("unnamed-system").to_string()
}

/// Resolve the scan config for a repository.
///
/// An explicit path must load; otherwise `svcmap.json` at the repository root is
/// used when present, and defaults named after the repository otherwise.
pub fn resolve_scan_config(explicit: Option<&str>, repo_root: &Path) -> Result<ScanConfig> {
    if let Some(path) = explicit {
        return load_scan_config(Path::new(path));
    }
    let conventional = repo_root.join(DEFAULT_CONFIG_FILE);
    if conventional.is_file() {
        return load_scan_config(&conventional);
    }
    Ok(ScanConfig::new(infer_system_name(repo_root)))
}

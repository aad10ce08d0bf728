use std::path::Path;

use anyhow::{Context, Result};
use svcmap_core::scan::{default_extractor_registry, scan_repository};
use svcmap_core::store::save_system;

use crate::{canonicalize_or_current, resolve_scan_config};

/// Scan a checked-out repository and write a fresh snapshot.
pub fn scan_command(repo: &str, commit: &str, config: Option<&str>, out: &str) -> Result<()> {
    let repo_root = canonicalize_or_current(repo)?;
    let scan_config = resolve_scan_config(config, &repo_root)?;
    let registry = default_extractor_registry(&scan_config);

    let system = scan_repository(&repo_root, commit, &scan_config, &registry)
        .with_context(|| format!("Failed to scan repository at {}", repo_root.display()))?;
    let out_path = Path::new(out);
    save_system(out_path, &system)
        .with_context(|| format!("Failed to write snapshot at {}", out_path.display()))?;

    println!("Scanned system:");
    println!("  Name:     {}", system.name());
    println!("  Commit:   {}", system.commit_id());
    println!("  Services: {}", system.microservice_count());
    println!("  Files:    {}", system.file_count());
    println!("  Output:   {}", out_path.display());
    Ok(())
}

use anyhow::{Context, Result};
use serde::Serialize;
use svcmap_core::boundary::discover_roots;

use crate::{canonicalize_or_current, resolve_scan_config};

#[derive(Debug, Serialize)]
struct RootEntry<'a> {
    name: &'a str,
    path: &'a str,
}

/// Print the service roots discovered under a repository.
pub fn roots_command(repo: &str, config: Option<&str>, json: bool) -> Result<()> {
    let repo_root = canonicalize_or_current(repo)?;
    let scan_config = resolve_scan_config(config, &repo_root)?;
    let roots = discover_roots(&repo_root, &scan_config.rules(), &scan_config.ignored_dirs)
        .with_context(|| format!("Failed to discover service roots under {}", repo_root.display()))?;

    if json {
        let entries: Vec<RootEntry> =
            roots.iter().map(|(path, name)| RootEntry { name: name.as_str(), path: path.as_str() }).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if roots.is_empty() {
        println!("No service roots found under {}.", repo_root.display());
        return Ok(());
    }
    println!("Service roots:");
    for (path, name) in &roots {
        let shown = if path.is_empty() { "/" } else { path.as_str() };
        println!("  - {name} ({shown})");
    }
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use svcmap_core::config::{load_scan_config, ScanConfig};
use svcmap_core::merge::MergeEngine;
use svcmap_core::store::{load_change, load_system, save_system};

/// Apply one change set to a snapshot and write the result.
pub fn merge_command(ir: &str, delta: &str, config: Option<&str>, out: &str, json: bool) -> Result<()> {
    let ir_path = Path::new(ir);
    let delta_path = Path::new(delta);
    let mut system =
        load_system(ir_path).with_context(|| format!("Failed to load snapshot at {}", ir_path.display()))?;
    let change =
        load_change(delta_path).with_context(|| format!("Failed to load change set at {}", delta_path.display()))?;
    let rules = match config {
        Some(path) => load_scan_config(Path::new(path))?.rules(),
        None => ScanConfig::new(system.name()).rules(),
    };

    let report = MergeEngine::new(rules).apply(&mut system, &change);
    let out_path = Path::new(out);
    save_system(out_path, &system)
        .with_context(|| format!("Failed to write snapshot at {}", out_path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !report.applied {
        println!("No changes to apply; snapshot left at commit {}.", system.commit_id());
        return Ok(());
    }
    println!("Merged {} -> {}", report.old_commit, report.new_commit);
    if !report.commit_matched {
        println!("  Warning: change set was computed against {}", change.old_commit);
    }
    println!("  Services added:   {}", report.services_added.len());
    println!("  Services removed: {}", report.services_removed.len());
    println!("  Files attached:   {}", report.files_attached);
    println!("  Files orphaned:   {}", report.files_orphaned);
    println!("  Files removed:    {}", report.files_removed);
    println!("  Files adopted:    {}", report.files_adopted);
    println!("  Skipped:          {}", report.unresolvable_skipped + report.duplicate_adds);
    println!("  Output:           {}", out_path.display());
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use svcmap_core::model::{ClassFile, ProjectFile, System};
use svcmap_core::store::load_system;

#[derive(Debug, Serialize)]
pub struct ServiceSummary {
    pub name: String,
    pub path: String,
    pub files: usize,
    pub endpoints: usize,
    pub rest_calls: usize,
}

#[derive(Debug, Serialize)]
pub struct SystemSummary {
    pub name: String,
    pub commit: String,
    pub services: Vec<ServiceSummary>,
    pub orphans: Vec<String>,
    pub endpoints: usize,
    pub rest_calls: usize,
}

/// Summarize a loaded snapshot.
pub fn summarize(system: &System) -> SystemSummary {
    let services = system
        .microservices()
        .map(|ms| {
            let classes: Vec<&ClassFile> = system.files_of(&ms.path).filter_map(ProjectFile::as_class).collect();
            ServiceSummary {
                name: ms.name.clone(),
                path: ms.path.clone(),
                files: system.files_of(&ms.path).count(),
                endpoints: classes.iter().map(|c| c.endpoints().len()).sum(),
                rest_calls: classes.iter().map(|c| c.rest_calls().len()).sum(),
            }
        })
        .collect();
    SystemSummary {
        name: system.name().to_string(),
        commit: system.commit_id().to_string(),
        services,
        orphans: system.orphans().map(|f| f.path().to_string()).collect(),
        endpoints: system.all_endpoints().len(),
        rest_calls: system.all_rest_calls().len(),
    }
}

/// Print a summary of a snapshot.
pub fn info_command(ir: &str, json: bool) -> Result<()> {
    let ir_path = Path::new(ir);
    let system = load_system(ir_path).with_context(|| format!("Failed to load snapshot at {}", ir_path.display()))?;
    let summary = summarize(&system);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("System: {}", summary.name);
    println!("Commit: {}", summary.commit);
    println!("Services:");
    for service in &summary.services {
        println!(
            "  - {} ({}): {} files, {} endpoints, {} rest calls",
            service.name, service.path, service.files, service.endpoints, service.rest_calls
        );
    }
    println!("Orphans: {}", summary.orphans.len());
    for path in &summary.orphans {
        println!("  - {path}");
    }
    println!("Endpoints: {}", summary.endpoints);
    println!("Rest calls: {}", summary.rest_calls);
    Ok(())
}

/// Load a snapshot and verify its structural invariants.
pub fn check_command(ir: &str) -> Result<()> {
    let ir_path = Path::new(ir);
    let system = load_system(ir_path).with_context(|| format!("Failed to load snapshot at {}", ir_path.display()))?;
    system.check_invariants().with_context(|| format!("Snapshot at {} is inconsistent", ir_path.display()))?;
    println!(
        "OK: {} services, {} files ({} orphans) at commit {}",
        system.microservice_count(),
        system.file_count(),
        system.orphan_count(),
        system.commit_id()
    );
    Ok(())
}

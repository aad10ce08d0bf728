//! Delta application: evolve one system snapshot into the next.
//!
//! A merge runs in three strictly ordered phases over a [`SystemChange`]:
//! boundary changes first (so new services exist before their files arrive),
//! then file changes in input order, then the commit id. File-scoped problems
//! are counted in the [`MergeReport`] and never abort the run.

pub mod plan;

use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;

use crate::boundary::{is_strictly_under, BoundaryRules};
use crate::delta::{ChangeType, Delta, SystemChange};
use crate::model::{Microservice, Owner, ProjectFile, System};

pub use plan::{plan_boundary_changes, BoundaryPlan, BoundarySignal, DropReason, DroppedSignal, SignalKind};

/// Outcome of applying one [`SystemChange`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// False when the change list was empty and nothing was touched.
    pub applied: bool,
    pub old_commit: String,
    pub new_commit: String,
    pub commit_matched: bool,
    pub services_added: Vec<String>,
    pub services_removed: Vec<String>,
    pub signals_dropped: Vec<DroppedSignal>,
    pub files_attached: usize,
    pub files_orphaned: usize,
    pub files_removed: usize,
    pub files_adopted: usize,
    pub unresolvable_skipped: usize,
    pub dangling_deletes: usize,
    pub duplicate_adds: usize,
    pub started_at: String,
    pub finished_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    rules: BoundaryRules,
}

impl MergeEngine {
    pub fn new(rules: BoundaryRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &BoundaryRules {
        &self.rules
    }

    /// Apply `change` to `system` in place.
    pub fn apply(&self, system: &mut System, change: &SystemChange) -> MergeReport {
        let mut report = MergeReport {
            old_commit: system.commit_id().to_string(),
            new_commit: system.commit_id().to_string(),
            commit_matched: change.old_commit == system.commit_id(),
            started_at: Utc::now().to_rfc3339(),
            ..MergeReport::default()
        };

        if change.is_empty() {
            debug!("Empty change set for {}; nothing to apply", change.new_commit);
            report.finished_at = Utc::now().to_rfc3339();
            return report;
        }
        if !report.commit_matched {
            warn!(
                "Change set was computed against commit '{}' but the system is at '{}'",
                change.old_commit,
                system.commit_id()
            );
        }

        let plan = plan_boundary_changes(system, change, &self.rules);
        for signal in &plan.signals {
            self.apply_signal(system, signal, &mut report);
        }
        report.signals_dropped = plan.dropped;

        for delta in &change.changes {
            match delta.change_type {
                ChangeType::Add => add_file(system, delta.payload(), delta, &mut report),
                ChangeType::Delete => delete_file(system, delta.old_path.as_deref(), &mut report),
                ChangeType::Modify => {
                    // An unparseable new state leaves the old file in place.
                    let Some(file) = delta.payload() else {
                        skip_unresolvable(delta, &mut report);
                        continue;
                    };
                    delete_file(system, delta.old_path.as_deref(), &mut report);
                    add_file(system, Some(file), delta, &mut report);
                }
            }
        }

        system.set_commit_id(change.new_commit.clone());
        report.applied = true;
        report.new_commit = change.new_commit.clone();
        report.finished_at = Utc::now().to_rfc3339();
        info!(
            "Merged {} changes into {}: +{} / -{} services, {} attached, {} orphaned, {} removed, {} adopted",
            change.changes.len(),
            report.new_commit,
            report.services_added.len(),
            report.services_removed.len(),
            report.files_attached,
            report.files_orphaned,
            report.files_removed,
            report.files_adopted
        );
        report
    }

    fn apply_signal(&self, system: &mut System, signal: &BoundarySignal, report: &mut MergeReport) {
        match signal.kind {
            SignalKind::Add => add_boundary(system, signal, report),
            SignalKind::Delete => remove_boundary(system, &signal.root, report),
        }
    }
}

fn add_boundary(system: &mut System, signal: &BoundarySignal, report: &mut MergeReport) {
    let root = signal.root.as_str();
    if system.microservice(root).is_some() {
        debug!("Service root {root} already present; ignoring {}", signal.descriptor);
        return;
    }
    if let Some(nested) = system.microservices().find(|ms| is_strictly_under(&ms.path, root)) {
        debug!("Service {} at {} is more specific than {root}; skipping", nested.name, nested.path);
        return;
    }
    let ancestors: Vec<String> =
        system.microservices().filter(|ms| is_strictly_under(root, &ms.path)).map(|ms| ms.path.clone()).collect();
    for ancestor in ancestors {
        remove_boundary(system, &ancestor, report);
    }

    if let Err(err) = system.insert_microservice(Microservice::new(signal.name.clone(), root)) {
        warn!("Could not create service {} at {root}: {err}", signal.name);
        return;
    }
    info!("Added service {} at {root}", signal.name);
    report.services_added.push(root.to_string());
    match system.adopt(root) {
        Ok(adopted) => report.files_adopted += adopted,
        Err(err) => warn!("Could not adopt orphans into {root}: {err}"),
    }
}

fn remove_boundary(system: &mut System, root: &str, report: &mut MergeReport) {
    match system.remove_microservice(root) {
        Ok((removed, orphaned)) => {
            info!("Removed service {} at {root}; {orphaned} files orphaned", removed.name);
            report.services_removed.push(root.to_string());
            report.files_orphaned += orphaned;
        }
        Err(err) => debug!("No service to remove at {root}: {err}"),
    }
}

fn skip_unresolvable(delta: &Delta, report: &mut MergeReport) {
    debug!("Skipping unresolvable payload for {}", delta.path().unwrap_or("<no path>"));
    report.unresolvable_skipped += 1;
}

fn add_file(system: &mut System, file: Option<ProjectFile>, delta: &Delta, report: &mut MergeReport) {
    let Some(file) = file else {
        skip_unresolvable(delta, report);
        return;
    };
    let path = file.path().to_string();
    if system.find_file(&path).is_some() {
        warn!("File {path} already present; ignoring ADD");
        report.duplicate_adds += 1;
        return;
    }
    let owner = system.resolve_owner(&path).map(|ms| ms.path.clone());
    let result = match &owner {
        Some(root) => system.attach(file, root),
        None => system.add_orphan(file),
    };
    match (result, owner) {
        (Ok(()), Some(_)) => report.files_attached += 1,
        (Ok(()), None) => {
            debug!("No service contains {path}; parked as orphan");
            report.files_orphaned += 1;
        }
        (Err(err), _) => warn!("Could not add {path}: {err}"),
    }
}

fn delete_file(system: &mut System, path: Option<&str>, report: &mut MergeReport) {
    let Some(path) = path else {
        report.dangling_deletes += 1;
        return;
    };
    match system.detach(path) {
        Some((_, Owner::Service(root))) => {
            debug!("Removed {path} from service at {root}");
            report.files_removed += 1;
        }
        Some((_, Owner::Orphan)) => {
            debug!("Removed orphan {path}");
            report.files_removed += 1;
        }
        None => {
            debug!("Nothing to remove at {path}");
            report.dangling_deletes += 1;
        }
    }
}

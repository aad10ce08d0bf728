//! Boundary planning: turn descriptor deltas into an ordered list of root changes.

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use crate::boundary::{declared_service_name, fallback_service_name, is_strictly_under, BoundaryRules};
use crate::delta::{ChangeType, Delta, SystemChange};
use crate::model::{ProjectFile, System};
use crate::scan::formats::is_maven_aggregator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Add,
    Delete,
}

/// A surviving boundary change. Deletes precede adds; each group keeps input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundarySignal {
    pub kind: SignalKind,
    /// Root directory of the descriptor.
    pub root: String,
    /// Service name for adds; the descriptor path otherwise.
    pub name: String,
    pub descriptor: String,
    /// Position of the originating delta in the change list.
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Descriptor MODIFYs never move boundaries.
    Modified,
    /// DELETE of a descriptor whose root hosts no microservice.
    Unresolved,
    /// Another signal of the same kind for the same root came first.
    Redundant,
    /// ADD whose root is an ancestor of another ADD in the same batch.
    Superseded,
    /// ADD of a Maven aggregator descriptor (`<modules>`); never a boundary.
    Aggregator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedSignal {
    pub descriptor: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoundaryPlan {
    pub signals: Vec<BoundarySignal>,
    pub dropped: Vec<DroppedSignal>,
}

impl BoundaryPlan {
    fn drop_signal(&mut self, descriptor: &str, reason: DropReason) {
        debug!("Dropping boundary signal for {descriptor}: {reason:?}");
        self.dropped.push(DroppedSignal { descriptor: descriptor.to_string(), reason });
    }
}

/// The descriptor path a delta touches, if any.
fn descriptor_path<'a>(delta: &'a Delta, rules: &BoundaryRules) -> Option<&'a str> {
    [delta.new_path.as_deref(), delta.old_path.as_deref()].into_iter().flatten().find(|p| rules.is_descriptor(p))
}

fn service_name(payload: Option<&ProjectFile>, root: &str) -> String {
    payload.and_then(declared_service_name).unwrap_or_else(|| fallback_service_name(root))
}

fn is_aggregator(payload: Option<&ProjectFile>) -> bool {
    payload.and_then(ProjectFile::as_config).is_some_and(|config| is_maven_aggregator(&config.data))
}

/// Select the boundary changes a batch implies, against the current system.
///
/// Duplicate signals of one kind for one root collapse to the first one in
/// input order. An ADD and a DELETE at the same root both survive, deletes
/// being applied before adds.
pub fn plan_boundary_changes(system: &System, change: &SystemChange, rules: &BoundaryRules) -> BoundaryPlan {
    let mut plan = BoundaryPlan::default();
    let mut candidates = Vec::new();

    for (index, delta) in change.changes.iter().enumerate() {
        let Some(descriptor) = descriptor_path(delta, rules) else {
            continue;
        };
        let Some(root) = rules.descriptor_root(descriptor) else {
            continue;
        };
        match delta.change_type {
            ChangeType::Modify => {
                plan.drop_signal(descriptor, DropReason::Modified);
            }
            ChangeType::Delete if system.microservice(&root).is_none() => {
                plan.drop_signal(descriptor, DropReason::Unresolved);
            }
            ChangeType::Delete => candidates.push(BoundarySignal {
                kind: SignalKind::Delete,
                name: descriptor.to_string(),
                root,
                descriptor: descriptor.to_string(),
                index,
            }),
            ChangeType::Add => {
                let payload = delta.payload();
                if is_aggregator(payload.as_ref()) {
                    plan.drop_signal(descriptor, DropReason::Aggregator);
                    continue;
                }
                candidates.push(BoundarySignal {
                    kind: SignalKind::Add,
                    name: service_name(payload.as_ref(), &root),
                    root,
                    descriptor: descriptor.to_string(),
                    index,
                });
            }
        }
    }

    let mut seen = BTreeSet::new();
    let mut unique = Vec::new();
    for signal in candidates {
        if seen.insert((signal.kind, signal.root.clone())) {
            unique.push(signal);
        } else {
            plan.drop_signal(&signal.descriptor, DropReason::Redundant);
        }
    }

    let add_roots: Vec<String> =
        unique.iter().filter(|s| s.kind == SignalKind::Add).map(|s| s.root.clone()).collect();
    for signal in unique {
        let superseded =
            signal.kind == SignalKind::Add && add_roots.iter().any(|other| is_strictly_under(other, &signal.root));
        if superseded {
            plan.drop_signal(&signal.descriptor, DropReason::Superseded);
        } else {
            plan.signals.push(signal);
        }
    }
    // Deletes first, so a descriptor swap at one root ends with the service present.
    plan.signals.sort_by_key(|signal| signal.kind == SignalKind::Add);

    plan
}

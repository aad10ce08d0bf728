mod common;

use common::{config_file, controller, owner_names, payload, pom_payload, service_class, system_with};
use serde_json::json;
use svcmap_core::delta::{Delta, SystemChange};
use svcmap_core::merge::{DropReason, MergeEngine};
use svcmap_core::model::{Owner, ProjectFile, System};

fn change(deltas: Vec<Delta>) -> SystemChange {
    SystemChange::new("c0", "c1", deltas)
}

fn merge(system: &mut System, deltas: Vec<Delta>) -> svcmap_core::merge::MergeReport {
    let report = MergeEngine::default().apply(system, &change(deltas));
    system.check_invariants().unwrap();
    report
}

fn gradle_payload(path: &str) -> serde_json::Value {
    json!({"type": "ConfigFile", "name": "build.gradle", "path": path, "data": {"plugins": {}}})
}

#[test]
fn empty_change_leaves_system_untouched() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    system.attach(config_file("/svc-a/app.yml"), "/svc-a").unwrap();
    let before = system.clone();

    let report = merge(&mut system, vec![]);
    assert!(!report.applied);
    assert_eq!(system, before);
    assert_eq!(system.commit_id(), "c0");

    for raw in [json!({"oldCommit": "c0", "newCommit": "c1"}), json!({"oldCommit": "c0", "newCommit": "c1", "changes": null})] {
        let absent: SystemChange = serde_json::from_value(raw).unwrap();
        MergeEngine::default().apply(&mut system, &absent);
        assert_eq!(system, before);
    }
}

#[test]
fn add_under_known_service_attaches_with_owner_name() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    let foo = controller("/svc-a/src/main/java/Foo.java", "Foo");

    let report = merge(&mut system, vec![Delta::add("/svc-a/src/main/java/Foo.java", payload(&foo))]);

    assert_eq!(report.files_attached, 1);
    assert_eq!(system.commit_id(), "c1");
    assert_eq!(system.microservice_name_of("/svc-a/src/main/java/Foo.java"), Some("svc-a"));
    let endpoints = system.all_endpoints();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].url, "/api/foo");
    assert_eq!(endpoints[0].method.microservice_name, "svc-a");
}

#[test]
fn add_without_service_parks_orphan_until_descriptor_arrives() {
    let mut system = system_with(&[]);
    let foo = controller("/svc-a/src/Foo.java", "Foo");

    let report = merge(&mut system, vec![Delta::add("/svc-a/src/Foo.java", payload(&foo))]);
    assert_eq!(report.files_orphaned, 1);
    assert_eq!(system.owner_of("/svc-a/src/Foo.java"), Some(&Owner::Orphan));

    let next = SystemChange::new("c1", "c2", vec![Delta::add("/svc-a/pom.xml", pom_payload("/svc-a/pom.xml", "svc-a"))]);
    let report = MergeEngine::default().apply(&mut system, &next);
    system.check_invariants().unwrap();

    assert_eq!(report.services_added, vec!["/svc-a".to_string()]);
    assert_eq!(report.files_adopted, 1);
    assert_eq!(system.orphan_count(), 0);
    assert_eq!(system.microservice("/svc-a").map(|m| m.name.as_str()), Some("svc-a"));
    assert!(owner_names(&system, "/svc-a/src/Foo.java").iter().all(|n| n == "svc-a"));
    assert!(system.files_of("/svc-a").any(|f| f.path() == "/svc-a/pom.xml"));
}

#[test]
fn nested_descriptor_splits_parent_service() {
    let mut system = system_with(&[("parent", "/parent")]);
    system.attach(config_file("/parent/app.yml"), "/parent").unwrap();
    system.attach(service_class("/parent/src/P.java", "P"), "/parent").unwrap();
    system.attach(service_class("/parent/child/src/C.java", "C"), "/parent").unwrap();

    let report = merge(&mut system, vec![Delta::add("/parent/child/pom.xml", pom_payload("/parent/child/pom.xml", "child"))]);

    assert_eq!(report.services_removed, vec!["/parent".to_string()]);
    assert_eq!(report.services_added, vec!["/parent/child".to_string()]);
    assert!(system.microservice("/parent").is_none());
    assert_eq!(system.microservice_name_of("/parent/child/src/C.java"), Some("child"));
    assert_eq!(system.microservice_name_of("/parent/child/pom.xml"), Some("child"));
    assert_eq!(system.owner_of("/parent/src/P.java"), Some(&Owner::Orphan));
    assert_eq!(system.owner_of("/parent/app.yml"), Some(&Owner::Orphan));
    assert!(owner_names(&system, "/parent/src/P.java").iter().all(String::is_empty));
}

#[test]
fn add_then_delete_restores_previous_snapshot() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    system.attach(config_file("/svc-a/app.yml"), "/svc-a").unwrap();
    let before = system.clone();
    let engine = MergeEngine::default();

    let foo = controller("/svc-a/src/Foo.java", "Foo");
    engine.apply(&mut system, &SystemChange::new("c0", "c1", vec![Delta::add("/svc-a/src/Foo.java", payload(&foo))]));
    engine.apply(&mut system, &SystemChange::new("c1", "c2", vec![Delta::delete("/svc-a/src/Foo.java")]));

    system.set_commit_id("c0");
    assert_eq!(system, before);
}

#[test]
fn boundary_changes_apply_before_file_changes() {
    let mut system = system_with(&[]);
    let foo = controller("/svc-new/src/Foo.java", "Foo");

    merge(
        &mut system,
        vec![
            Delta::add("/svc-new/src/Foo.java", payload(&foo)),
            Delta::add("/svc-new/pom.xml", pom_payload("/svc-new/pom.xml", "svc-new")),
        ],
    );

    assert_eq!(system.orphan_count(), 0);
    assert_eq!(system.microservice_name_of("/svc-new/src/Foo.java"), Some("svc-new"));
}

#[test]
fn descriptor_swap_keeps_service_in_either_order() {
    let delete_pom = Delta::delete("/svc-a/pom.xml");
    let add_gradle = Delta::add("/svc-a/build.gradle", gradle_payload("/svc-a/build.gradle"));

    for deltas in [vec![delete_pom.clone(), add_gradle.clone()], vec![add_gradle.clone(), delete_pom.clone()]] {
        let mut system = system_with(&[("billing", "/svc-a")]);
        system.attach(config_file("/svc-a/app.yml"), "/svc-a").unwrap();

        let report = merge(&mut system, deltas);

        assert!(report.signals_dropped.is_empty());
        assert_eq!(report.services_removed, vec!["/svc-a".to_string()]);
        assert_eq!(report.services_added, vec!["/svc-a".to_string()]);
        assert_eq!(report.files_adopted, 1);
        assert_eq!(system.microservice("/svc-a").map(|m| m.name.as_str()), Some("svc-a"));
        assert_eq!(system.owner_of("/svc-a/app.yml"), Some(&Owner::Service("/svc-a".into())));
        assert_eq!(system.microservice_name_of("/svc-a/build.gradle"), Some("svc-a"));
        assert_eq!(system.orphan_count(), 0);
    }
}

#[test]
fn duplicate_deletes_for_one_root_collapse_to_first() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    let report = merge(&mut system, vec![Delta::delete("/svc-a/build.gradle"), Delta::delete("/svc-a/pom.xml")]);
    assert_eq!(report.services_removed, vec!["/svc-a".to_string()]);
    assert_eq!(report.signals_dropped.len(), 1);
    assert_eq!(report.signals_dropped[0].descriptor, "/svc-a/pom.xml");
    assert_eq!(report.signals_dropped[0].reason, DropReason::Redundant);
}

#[test]
fn aggregator_pom_add_creates_no_service() {
    let aggregator = json!({
        "type": "ConfigFile",
        "name": "pom.xml",
        "path": "/platform/pom.xml",
        "data": {"project": {"artifactId": "platform", "modules": {"module": ["core"]}}}
    });
    let mut system = system_with(&[]);
    let report = merge(&mut system, vec![Delta::add("/platform/pom.xml", aggregator)]);

    assert!(report.services_added.is_empty());
    assert_eq!(report.signals_dropped[0].reason, DropReason::Aggregator);
    assert_eq!(system.microservice_count(), 0);
    assert_eq!(system.owner_of("/platform/pom.xml"), Some(&Owner::Orphan));
}

#[test]
fn duplicate_adds_name_service_from_first_signal() {
    let pom = Delta::add("/svc-x/pom.xml", pom_payload("/svc-x/pom.xml", "alpha"));
    let gradle = Delta::add("/svc-x/build.gradle", gradle_payload("/svc-x/build.gradle"));

    let mut first = system_with(&[]);
    merge(&mut first, vec![pom.clone(), gradle.clone()]);
    assert_eq!(first.microservice("/svc-x").map(|m| m.name.as_str()), Some("alpha"));

    let mut second = system_with(&[]);
    merge(&mut second, vec![gradle, pom]);
    assert_eq!(second.microservice("/svc-x").map(|m| m.name.as_str()), Some("svc-x"));
}

#[test]
fn ancestor_add_in_same_batch_is_superseded() {
    let mut system = system_with(&[]);
    let report = merge(
        &mut system,
        vec![
            Delta::add("/p/pom.xml", pom_payload("/p/pom.xml", "p")),
            Delta::add("/p/c/pom.xml", pom_payload("/p/c/pom.xml", "c")),
        ],
    );
    assert_eq!(report.services_added, vec!["/p/c".to_string()]);
    assert_eq!(report.signals_dropped[0].reason, DropReason::Superseded);
    assert_eq!(system.owner_of("/p/pom.xml"), Some(&Owner::Orphan));
}

#[test]
fn ancestor_add_is_skipped_when_nested_service_exists() {
    let mut system = system_with(&[("c", "/p/c")]);
    let report = merge(&mut system, vec![Delta::add("/p/pom.xml", pom_payload("/p/pom.xml", "p"))]);
    assert!(report.services_added.is_empty());
    assert!(system.microservice("/p").is_none());
    assert_eq!(system.owner_of("/p/pom.xml"), Some(&Owner::Orphan));
}

#[test]
fn descriptor_delete_only_removes_exact_root() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    let report = merge(&mut system, vec![Delta::delete("/svc-a/sub/pom.xml")]);
    assert_eq!(report.signals_dropped[0].reason, DropReason::Unresolved);
    assert!(system.microservice("/svc-a").is_some());
    assert_eq!(report.dangling_deletes, 1);
}

#[test]
fn descriptor_modify_keeps_boundary_but_replaces_file() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    let original = ProjectFile::from_payload(&pom_payload("/svc-a/pom.xml", "svc-a")).unwrap();
    system.attach(original, "/svc-a").unwrap();

    let report = merge(
        &mut system,
        vec![Delta::modify("/svc-a/pom.xml", "/svc-a/pom.xml", pom_payload("/svc-a/pom.xml", "renamed"))],
    );

    assert_eq!(report.signals_dropped[0].reason, DropReason::Modified);
    assert_eq!(system.microservice("/svc-a").map(|m| m.name.as_str()), Some("svc-a"));
    let data = &system.find_file("/svc-a/pom.xml").and_then(ProjectFile::as_config).unwrap().data;
    assert_eq!(data["project"]["artifactId"], "renamed");
}

#[test]
fn modify_moves_file_between_paths() {
    let mut system = system_with(&[("svc-a", "/svc-a"), ("svc-b", "/svc-b")]);
    system.attach(service_class("/svc-a/src/Job.java", "Job"), "/svc-a").unwrap();

    let moved = service_class("/svc-b/src/Job.java", "Job");
    let report = merge(&mut system, vec![Delta::modify("/svc-a/src/Job.java", "/svc-b/src/Job.java", payload(&moved))]);

    assert_eq!(report.files_removed, 1);
    assert_eq!(report.files_attached, 1);
    assert!(system.find_file("/svc-a/src/Job.java").is_none());
    assert_eq!(system.microservice_name_of("/svc-b/src/Job.java"), Some("svc-b"));
}

#[test]
fn unresolvable_payloads_are_skipped() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    let report = merge(
        &mut system,
        vec![
            Delta::add("/svc-a/src/Broken.java", serde_json::Value::Null),
            Delta::add("/svc-a/src/Empty.java", json!({})),
            Delta::add("/svc-a/src/Garbled.java", json!({"fileType": "JCLASS"})),
        ],
    );
    assert_eq!(report.unresolvable_skipped, 3);
    assert_eq!(system.file_count(), 0);
    assert_eq!(system.commit_id(), "c1");
}

#[test]
fn unresolvable_modify_keeps_existing_file() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    system.attach(service_class("/svc-a/src/Job.java", "Job"), "/svc-a").unwrap();
    let before = system.find_file("/svc-a/src/Job.java").cloned();

    let report = merge(
        &mut system,
        vec![Delta::modify("/svc-a/src/Job.java", "/svc-a/src/Job.java", serde_json::Value::Null)],
    );

    assert_eq!(report.unresolvable_skipped, 1);
    assert_eq!(report.files_removed, 0);
    assert_eq!(system.file_count(), 1);
    assert_eq!(system.find_file("/svc-a/src/Job.java").cloned(), before);
}

#[test]
fn duplicate_path_add_is_absorbed() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    system.attach(service_class("/svc-a/src/Job.java", "Job"), "/svc-a").unwrap();
    let before = system.find_file("/svc-a/src/Job.java").cloned();

    let replacement = controller("/svc-a/src/Job.java", "Job");
    let report = merge(&mut system, vec![Delta::add("/svc-a/src/Job.java", payload(&replacement))]);

    assert_eq!(report.duplicate_adds, 1);
    assert_eq!(system.find_file("/svc-a/src/Job.java").cloned(), before);
}

#[test]
fn delete_of_absent_path_is_a_noop() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    let report = merge(&mut system, vec![Delta::delete("/svc-a/src/Never.java")]);
    assert_eq!(report.dangling_deletes, 1);
    assert_eq!(system.file_count(), 0);
}

#[test]
fn delete_removes_orphans_too() {
    let mut system = system_with(&[]);
    system.add_orphan(config_file("/loose/app.yml")).unwrap();
    let report = merge(&mut system, vec![Delta::delete("/loose/app.yml")]);
    assert_eq!(report.files_removed, 1);
    assert_eq!(system.orphan_count(), 0);
}

#[test]
fn commit_mismatch_is_flagged_not_fatal() {
    let mut system = system_with(&[("svc-a", "/svc-a")]);
    let stale = SystemChange::new("other", "c9", vec![Delta::add("/svc-a/app.yml", payload(&config_file("/svc-a/app.yml")))]);

    let report = MergeEngine::default().apply(&mut system, &stale);

    assert!(!report.commit_matched);
    assert!(report.applied);
    assert_eq!(report.old_commit, "c0");
    assert_eq!(report.new_commit, "c9");
    assert_eq!(system.commit_id(), "c9");
    assert_eq!(system.file_count(), 1);
    assert!(!report.started_at.is_empty());
    assert!(!report.finished_at.is_empty());
}

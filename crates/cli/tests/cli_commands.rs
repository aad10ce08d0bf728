use std::fs;
use std::path::Path;

use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_repo(root: &Path) {
    write(root, "orders/pom.xml", "<project><artifactId>order-service</artifactId></project>");
    write(root, "orders/src/main/resources/application.yml", "server:\n  port: 8081\n");
    write(root, "billing/build.gradle", "plugins {\n}\n");
    write(root, "billing/settings.gradle", "rootProject.name = 'billing-service'\n");
}

#[test]
fn roots_lists_discovered_services() {
    let dir = tempdir().expect("tempdir");
    sample_repo(dir.path());

    assert_cmd::cargo::cargo_bin_cmd!("svcmap")
        .arg("roots")
        .arg("--repo")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("order-service (/orders)"))
        .stdout(predicate::str::contains("billing-service (/billing)"));
}

#[test]
fn roots_json_is_machine_readable() {
    let dir = tempdir().expect("tempdir");
    sample_repo(dir.path());

    let output = assert_cmd::cargo::cargo_bin_cmd!("svcmap")
        .args(["roots", "--json", "--repo"])
        .arg(dir.path())
        .output()
        .expect("run roots");
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(parsed, json!([{"name": "billing-service", "path": "/billing"}, {"name": "order-service", "path": "/orders"}]));
}

#[test]
fn roots_fails_for_missing_repository() {
    let dir = tempdir().expect("tempdir");
    assert_cmd::cargo::cargo_bin_cmd!("svcmap")
        .arg("roots")
        .arg("--repo")
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to discover service roots"));
}

#[test]
fn scan_merge_info_check_pipeline() {
    let dir = tempdir().expect("tempdir");
    let repo = dir.path().join("repo");
    sample_repo(&repo);
    let ir = dir.path().join("ir.json");
    let next = dir.path().join("ir-next.json");
    let delta = dir.path().join("delta.json");

    assert_cmd::cargo::cargo_bin_cmd!("svcmap")
        .args(["scan", "--commit", "c0", "--repo"])
        .arg(&repo)
        .arg("--out")
        .arg(&ir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Services: 2"));

    let change = json!({
        "oldCommit": "c0",
        "newCommit": "c1",
        "changes": [
            {"newPath": "/shipping/src/Ship.yml", "changeType": "ADD",
             "data": {"type": "ConfigFile", "name": "Ship.yml", "data": {"a": 1}}},
            {"newPath": "/shipping/pom.xml", "changeType": "ADD",
             "data": {"type": "ConfigFile", "name": "pom.xml", "data": {"project": {"artifactId": "shipping"}}}},
            {"oldPath": "/billing/build.gradle", "changeType": "DELETE"}
        ]
    });
    fs::write(&delta, serde_json::to_string_pretty(&change).unwrap()).unwrap();

    let output = assert_cmd::cargo::cargo_bin_cmd!("svcmap")
        .args(["merge", "--json", "--ir"])
        .arg(&ir)
        .arg("--delta")
        .arg(&delta)
        .arg("--out")
        .arg(&next)
        .output()
        .expect("run merge");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report json");
    assert_eq!(report["new_commit"], "c1");
    assert_eq!(report["services_added"], json!(["/shipping"]));
    assert_eq!(report["services_removed"], json!(["/billing"]));

    assert_cmd::cargo::cargo_bin_cmd!("svcmap")
        .args(["info", "--ir"])
        .arg(&next)
        .assert()
        .success()
        .stdout(predicate::str::contains("Commit: c1"))
        .stdout(predicate::str::contains("shipping (/shipping): 2 files"))
        .stdout(predicate::str::contains("Orphans: 0"));

    assert_cmd::cargo::cargo_bin_cmd!("svcmap")
        .args(["check", "--ir"])
        .arg(&next)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 2 services"));
}

#[test]
fn check_rejects_overlapping_snapshot() {
    let dir = tempdir().expect("tempdir");
    let ir = dir.path().join("bad.json");
    let doc = json!({
        "name": "demo",
        "commitID": "c0",
        "microservices": [{"name": "p", "path": "/p", "files": []}, {"name": "c", "path": "/p/c", "files": []}],
        "orphans": []
    });
    fs::write(&ir, doc.to_string()).unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("svcmap")
        .args(["check", "--ir"])
        .arg(&ir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load snapshot"));
}

#[test]
fn merge_rejects_malformed_change_set() {
    let dir = tempdir().expect("tempdir");
    let ir = dir.path().join("ir.json");
    fs::write(&ir, json!({"name": "demo", "commitID": "c0"}).to_string()).unwrap();
    let delta = dir.path().join("delta.json");
    fs::write(&delta, "[not a change set").unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("svcmap")
        .args(["merge", "--ir"])
        .arg(&ir)
        .arg("--delta")
        .arg(&delta)
        .arg("--out")
        .arg(dir.path().join("out.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load change set"));
    assert!(!dir.path().join("out.json").exists());
}

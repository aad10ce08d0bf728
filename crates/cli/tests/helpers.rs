use std::fs;
use std::path::Path;

use svcmap::{canonicalize_or_current, infer_system_name, init_logging};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");

    std::env::set_current_dir(original).expect("restore cwd");
    assert_eq!(result, expected);
}

#[test]
fn canonicalize_or_current_joins_missing_paths_onto_cwd() {
    let tmp = tempdir().expect("tempdir");
    let nested = tmp.path().join("nested");
    fs::create_dir_all(&nested).expect("create nested");

    let existing = canonicalize_or_current(nested.to_str().expect("utf-8")).expect("canonicalize nested");
    assert_eq!(existing, nested.canonicalize().expect("canonicalize nested"));

    let missing = canonicalize_or_current("does-not-exist-anywhere").expect("fallback");
    assert!(missing.is_absolute());
    assert!(missing.ends_with("does-not-exist-anywhere"));
}

#[test]
fn infer_system_name_handles_windows_style_paths() {
    assert_eq!(infer_system_name(Path::new("C:/work/shop")), "shop");
}

#[test]
fn init_logging_is_idempotent() {
    init_logging(true);
    init_logging(false);
}

use std::fs;

use namecorpus::{canonicalize_or_current, infer_project_name, sha256_file};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let nested = tmp.path().join("nested");
    fs::create_dir_all(&nested).expect("create nested");

    let result = canonicalize_or_current(nested.to_str().unwrap()).expect("canonicalize");
    assert_eq!(result, nested.canonicalize().unwrap());
}

#[test]
fn canonicalize_or_current_joins_missing_relative_path() {
    let cwd = std::env::current_dir().expect("cwd");
    let result = canonicalize_or_current("does-not-exist-yet").expect("fallback");
    assert_eq!(result, cwd.join("does-not-exist-yet"));
}

#[test]
fn infer_project_name_uses_last_component() {
    assert_eq!(
        infer_project_name(std::path::Path::new("/work/firmware-corpus")),
        "firmware-corpus"
    );
    assert_eq!(infer_project_name(std::path::Path::new("/")), "unnamed-project");
}

#[test]
fn sha256_file_hashes_contents() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("data.bin");
    fs::write(&path, b"abc").unwrap();
    assert_eq!(
        sha256_file(&path).unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert!(sha256_file(&tmp.path().join("missing")).is_err());
}

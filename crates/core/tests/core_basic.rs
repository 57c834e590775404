#[test]
fn version_matches_package_version() {
    assert_eq!(namecorpus_core::version(), env!("CARGO_PKG_VERSION"));
    assert!(!namecorpus_core::version().is_empty());
}

use std::fs;

use namecorpus_core::names::{
    is_cplusplus_signature, is_required_name, load_name_map, method_name, Blocklist, NameFilter,
};
use tempfile::tempdir;

#[test]
fn method_name_reduces_cplusplus_signatures() {
    let cases = [
        ("std::vector<int>::push_back(int const&)", Some("push_back")),
        ("Foo::~Foo()", Some("Foo")),
        ("Foo::bar(int) const", Some("bar")),
        ("operator new(unsigned long)", Some("new")),
        ("(anonymous namespace)::helper()", Some("helper")),
        ("Widget::instance()*", Some("instance")),
        ("foo(int)::bar", None),
        ("(*)()", None),
        ("plain_name", None),
    ];
    for (signature, expected) in cases {
        assert_eq!(method_name(signature).as_deref(), expected, "{signature}");
    }
}

#[test]
fn name_predicates() {
    assert!(is_cplusplus_signature("Foo::bar(int)"));
    assert!(!is_cplusplus_signature("Foo::bar"));

    assert!(is_required_name("ReadFile"));
    assert!(!is_required_name("sub_401000"));
    assert!(!is_required_name("_ZN3foo3barEv"));
    assert!(!is_required_name("_[thunk]"));
}

#[test]
fn blocklist_matches_prefixes() {
    let blocklist = Blocklist::from_entries(["nullsub", "j_", "  ", "__imp_"]);
    assert_eq!(blocklist.len(), 3);
    assert!(!blocklist.is_meaningful("nullsub_12"));
    assert!(!blocklist.is_meaningful("j_"));
    assert!(!blocklist.is_meaningful("__imp_CreateFileW"));
    assert!(blocklist.is_meaningful("CreateFileW"));
    assert!(Blocklist::default().is_empty());
}

#[test]
fn load_name_map_keys_by_start_and_filters() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("prog.name_and_addr");
    fs::write(
        &path,
        r#"{
            "ReadFile": [4096, 4200],
            "sub_401000": [8192, 8300],
            "nullsub_3": [8400, 8401],
            "Parser::parse(char const*)": [9000, 9100],
            "(*)()": [9200, 9300]
        }"#,
    )
    .unwrap();

    let unfiltered = load_name_map(&path, NameFilter::default()).expect("load");
    assert_eq!(unfiltered.len(), 5);
    assert_eq!(unfiltered[&9000], "Parser::parse(char const*)");

    let blocklist = Blocklist::from_entries(["nullsub"]);
    let filter = NameFilter { blocklist: Some(&blocklist), method_names: true };
    let filtered = load_name_map(&path, filter).expect("load filtered");
    let names: Vec<(u64, &str)> = filtered.iter().map(|(k, v)| (*k, v.as_str())).collect();
    assert_eq!(names, vec![(4096, "ReadFile"), (9000, "parse")]);
}

#[test]
fn load_name_map_reports_bad_files() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("missing.name_and_addr");
    let err = load_name_map(&missing, NameFilter::default()).unwrap_err();
    assert!(err.to_string().contains("missing.name_and_addr"));

    let bad = dir.path().join("bad.name_and_addr");
    fs::write(&bad, "{\"a\": [1]}").unwrap();
    assert!(load_name_map(&bad, NameFilter::default()).is_err());
}

#[test]
fn blocklist_reads_one_prefix_per_line() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("blocklist.txt");
    fs::write(&path, "nullsub\n\nj_\n").unwrap();
    let blocklist = Blocklist::from_file(&path).expect("blocklist");
    assert_eq!(blocklist.len(), 2);
}

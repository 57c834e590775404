use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use namecorpus_core::db::ProjectLayout;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::tempdir;

fn init_project(root: &Path) {
    cargo_bin_cmd!("namecorpus")
        .arg("init-project")
        .arg("--root")
        .arg(root)
        .arg("--name")
        .arg("CorpusProject")
        .assert()
        .success()
        .stdout(contains("Initialized namecorpus project"));
}

#[test]
fn init_project_creates_layout_and_database() {
    let dir = tempdir().expect("tempdir");
    init_project(dir.path());

    let layout = ProjectLayout::new(dir.path());
    assert!(layout.project_config_path.is_file());
    assert!(layout.db_path.is_file());
    assert!(layout.corpus_dir.is_dir());
    assert!(layout.models_dir.is_dir());
    assert!(layout.records_dir.is_dir());
}

#[test]
fn init_project_defaults_to_current_directory() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("namecorpus").current_dir(dir.path()).arg("init-project").assert().success();
    assert!(ProjectLayout::new(dir.path()).project_config_path.is_file());
}

#[test]
fn project_info_reports_configuration() {
    let dir = tempdir().expect("tempdir");
    init_project(dir.path());

    cargo_bin_cmd!("namecorpus")
        .arg("project-info")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("Name: CorpusProject"))
        .stdout(contains("Dialect: decompiler"));

    let output = cargo_bin_cmd!("namecorpus")
        .arg("project-info")
        .arg("--root")
        .arg(dir.path())
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).expect("project-info json");
    assert_eq!(body["name"], "CorpusProject");
    assert_eq!(body["schema_version"], 2);
    assert_eq!(body["available_hosts"][0], "json-dump");
    assert_eq!(body["pipeline"]["keep_calls"], true);
    assert_eq!(body["extraction_runs"].as_array().unwrap().len(), 0);
}

#[test]
fn project_info_fails_when_config_missing() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("namecorpus")
        .arg("project-info")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("Failed to read project config"));
}

#[test]
fn segment_prints_one_line_per_name() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("namecorpus")
        .arg("segment")
        .arg("--root")
        .arg(dir.path())
        .arg("ReadFileIntoBuffer")
        .arg("HTTP_get")
        .assert()
        .success()
        .stdout(contains("ReadFileIntoBuffer\tread file into buffer\n"))
        .stdout(contains("HTTP_get\thttp get\n"));
}

#[test]
fn segment_emits_json_tokens() {
    let dir = tempdir().expect("tempdir");
    let output = cargo_bin_cmd!("namecorpus")
        .arg("segment")
        .arg("--root")
        .arg(dir.path())
        .arg("--json")
        .arg("closeHandle")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).expect("segment json");
    assert_eq!(body[0]["name"], "closeHandle");
    assert_eq!(body[0]["tokens"], serde_json::json!(["close", "handle"]));
}

#[test]
fn tokenize_reads_stdin_and_suppresses_calls() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("namecorpus")
        .arg("tokenize")
        .arg("--root")
        .arg(dir.path())
        .arg("--no-calls")
        .arg("-")
        .write_stdin("int sub_401000(char *s){ return strlen(s); }")
        .assert()
        .success()
        .stdout("int <FUNCTION> ( char * s ) { return <FUNCTION> ( s ) ; }\n");
}

#[test]
fn verbosity_flags_control_debug_logging() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("namecorpus")
        .env_remove("RUST_LOG")
        .args(["-v", "tokenize", "--root"])
        .arg(dir.path())
        .arg("-")
        .write_stdin("x = 1;")
        .assert()
        .success()
        .stderr(contains("Tokenizing -"));

    cargo_bin_cmd!("namecorpus")
        .env_remove("RUST_LOG")
        .args(["tokenize", "--root"])
        .arg(dir.path())
        .arg("-")
        .write_stdin("x = 1;")
        .assert()
        .success()
        .stderr(contains("Tokenizing").not());
}

#[test]
fn tokenize_masks_the_function_name() {
    let dir = tempdir().expect("tempdir");
    let source = dir.path().join("fn.c");
    fs::write(&source, "int ReadFile(int a1) { return ReadFile(a1 - 1); }").unwrap();

    cargo_bin_cmd!("namecorpus")
        .arg("tokenize")
        .arg("--root")
        .arg(dir.path())
        .arg("--mask")
        .arg("ReadFile")
        .arg(&source)
        .assert()
        .success()
        .stdout("int <FUNCTION> ( int a1 ) { return <FUNCTION> ( a1 - <Number> ) ; }\n");
}

#[test]
fn tokenize_uses_dialect_from_config_file() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("pipeline.yaml");
    fs::write(&config, "dialect: analysis-tool\nkeep_strings: false\n").unwrap();

    cargo_bin_cmd!("namecorpus")
        .arg("tokenize")
        .arg("--root")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("-")
        .write_stdin("var_8 = puts(\"hi\");")
        .assert()
        .success()
        .stdout("<VARIBLE> = <FUNCTION> ( <STRING> ) ;\n");
}

#[test]
fn tokenize_rejects_unknown_dialect() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("namecorpus")
        .arg("tokenize")
        .arg("--root")
        .arg(dir.path())
        .arg("--dialect")
        .arg("ida")
        .arg("-")
        .assert()
        .failure()
        .stderr(contains("Unknown dialect"));
}

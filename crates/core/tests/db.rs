use rusqlite::Connection;
use tempfile::tempdir;

use namecorpus_core::db::{
    CorpusBuildRecord, DbError, ExtractionRunRecord, ProjectConfig, ProjectContext, ProjectDb,
    ProjectLayout, RunStatus, CURRENT_SCHEMA_VERSION,
};

fn run(binary: &str, status: RunStatus, functions: i64) -> ExtractionRunRecord {
    ExtractionRunRecord {
        binary: binary.into(),
        binary_hash: Some(format!("hash-{binary}")),
        host: "json-dump".into(),
        status,
        functions,
        started_at: "t0".into(),
        finished_at: "t1".into(),
    }
}

fn build(split: &str, representation: &str, pairs: i64) -> CorpusBuildRecord {
    CorpusBuildRecord {
        split: split.into(),
        representation: representation.into(),
        pairs,
        dropped: 1,
        src_path: format!("corpus/{split}/src-{split}-{representation}.txt"),
        tgt_path: format!("corpus/{split}/tgt-{split}-{representation}.txt"),
        created_at: "t2".into(),
    }
}

#[test]
fn fresh_db_is_migrated_to_current_schema() {
    let dir = tempdir().expect("tempdir");
    let db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");
    assert_eq!(db.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);

    // Re-opening an up-to-date database is a no-op.
    drop(db);
    let db = ProjectDb::open(&dir.path().join("project.db")).expect("reopen db");
    assert_eq!(db.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn extraction_runs_insert_and_filter() {
    let dir = tempdir().expect("tempdir");
    let db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");

    db.insert_extraction_run(&run("bin/a", RunStatus::Succeeded, 12)).expect("insert a");
    db.insert_extraction_run(&run("bin/b", RunStatus::Skipped, 0)).expect("insert b");
    let mut failed = run("bin/a", RunStatus::Failed, 0);
    failed.binary_hash = None;
    db.insert_extraction_run(&failed).expect("insert a again");

    let all = db.list_extraction_runs(None).expect("list");
    assert_eq!(all.len(), 3);

    let only_a = db.list_extraction_runs(Some("bin/a")).expect("filter");
    assert_eq!(only_a.len(), 2);
    assert_eq!(only_a[0], run("bin/a", RunStatus::Succeeded, 12));
    assert_eq!(only_a[1].status, RunStatus::Failed);
    assert!(only_a[1].binary_hash.is_none());

    assert!(db.list_extraction_runs(Some("bin/missing")).unwrap().is_empty());
}

#[test]
fn corpus_builds_insert_and_filter() {
    let dir = tempdir().expect("tempdir");
    let db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");

    db.insert_corpus_build(&build("train", "inst", 10)).unwrap();
    db.insert_corpus_build(&build("train", "pc", 10)).unwrap();
    db.insert_corpus_build(&build("valid", "pc", 2)).unwrap();

    assert_eq!(db.list_corpus_builds(None).unwrap().len(), 3);
    let train = db.list_corpus_builds(Some("train")).unwrap();
    assert_eq!(train, vec![build("train", "inst", 10), build("train", "pc", 10)]);
}

#[test]
fn unknown_status_in_db_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("project.db");
    let db = ProjectDb::open(&db_path).expect("open db");
    db.insert_extraction_run(&run("bin/a", RunStatus::Succeeded, 1)).unwrap();
    db.connection().execute("UPDATE extraction_runs SET status = 'exploded'", []).unwrap();

    let err = db.list_extraction_runs(None).unwrap_err();
    assert!(matches!(err, DbError::InvalidStatus(ref s) if s == "exploded"), "{err}");
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("project.db");
    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
    }

    let err = ProjectDb::open(&db_path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion { found, max_supported, .. } => {
            assert_eq!(found, 99);
            assert_eq!(max_supported, CURRENT_SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn run_status_parses_case_insensitively() {
    assert_eq!("Succeeded".parse::<RunStatus>(), Ok(RunStatus::Succeeded));
    assert_eq!("skipped".parse::<RunStatus>(), Ok(RunStatus::Skipped));
    assert!("unknown".parse::<RunStatus>().is_err());
    assert_eq!(RunStatus::Failed.as_str(), "failed");
}

#[test]
fn project_context_loads_config_and_db() {
    let temp = tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());
    std::fs::create_dir_all(&layout.meta_dir).unwrap();

    let config = ProjectConfig::new("CtxProject", layout.db_path_relative_string());
    assert_eq!(config.db.path, ".namecorpus/project.db");
    std::fs::write(&layout.project_config_path, serde_json::to_string_pretty(&config).unwrap())
        .unwrap();

    let ctx = ProjectContext::from_root(temp.path()).expect("context");
    assert_eq!(ctx.config.name, "CtxProject");
    assert!(ctx.db_path.is_file());
    assert_eq!(ctx.pipeline().host, "json-dump");
    assert_eq!(
        ctx.resolve(std::path::Path::new("models/words.txt")),
        temp.path().join("models/words.txt")
    );

    ctx.db.list_extraction_runs(None).expect("list runs");
    ctx.load_segmenter().expect("default segmenter");
    assert!(ctx.load_blocklist().expect("blocklist").is_some());
}

#[test]
fn project_context_fails_without_config() {
    let temp = tempdir().unwrap();
    let err = ProjectContext::from_root(temp.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to read project config"));
}

#[test]
fn layout_paths_hang_off_root() {
    let layout = ProjectLayout::new("/data/proj");
    assert_eq!(layout.meta_dir, std::path::Path::new("/data/proj/.namecorpus"));
    assert_eq!(layout.split_dir("train"), std::path::Path::new("/data/proj/corpus/train"));
    assert_eq!(layout.records_dir, std::path::Path::new("/data/proj/records"));
}

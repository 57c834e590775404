use std::fs;

use anyhow::{Context, Result};
use namecorpus_core::config::PipelineConfig;
use namecorpus_core::db::{
    CorpusBuildRecord, ExtractionRunRecord, ProjectConfig, ProjectContext, ProjectDb,
    ProjectLayout,
};
use namecorpus_core::services::default_host_registry;
use serde::Serialize;

use crate::commands::print_dir_status;
use crate::{canonicalize_or_current, infer_project_name};

#[derive(Serialize)]
pub struct ProjectInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub schema_version: i32,
    pub available_hosts: Vec<String>,
    pub pipeline: PipelineConfig,
    pub layout: ProjectInfoLayout,
    pub extraction_runs: Vec<ExtractionRunRecord>,
    pub corpus_builds: Vec<CorpusBuildRecord>,
}

#[derive(Serialize)]
pub struct ProjectInfoLayout {
    pub meta_dir: String,
    pub corpus_dir: String,
    pub models_dir: String,
    pub records_dir: String,
}

/// Initialize a new project at `root`.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    for (label, dir) in [
        ("meta", &layout.meta_dir),
        ("corpus", &layout.corpus_dir),
        ("models", &layout.models_dir),
        ("records", &layout.records_dir),
    ] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {label} dir: {}", dir.display()))?;
    }

    let config = ProjectConfig::new(&project_name, layout.db_path_relative_string());
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.project_config_path.display())
    })?;

    // Create the database up front so follow-on commands can rely on it.
    ProjectDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize project database at {}", layout.db_path.display())
    })?;

    println!("Initialized namecorpus project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Corpus dir: {}", layout.corpus_dir.display());
    println!("  Models dir: {}", layout.models_dir.display());
    println!("  Records dir: {}", layout.records_dir.display());

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let layout = &ctx.layout;

    let snapshot = ProjectInfoSnapshot {
        name: ctx.config.name.clone(),
        root: layout.root.display().to_string(),
        config_file: layout.project_config_path.display().to_string(),
        config_version: ctx.config.config_version.clone(),
        db_path: ctx.db_path.display().to_string(),
        schema_version: ctx.db.schema_version().context("Failed to read schema version")?,
        available_hosts: default_host_registry().names(),
        pipeline: ctx.config.pipeline.clone(),
        layout: ProjectInfoLayout {
            meta_dir: layout.meta_dir.display().to_string(),
            corpus_dir: layout.corpus_dir.display().to_string(),
            models_dir: layout.models_dir.display().to_string(),
            records_dir: layout.records_dir.display().to_string(),
        },
        extraction_runs: ctx.db.list_extraction_runs(None).context("Failed to list runs")?,
        corpus_builds: ctx.db.list_corpus_builds(None).context("Failed to list corpus builds")?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let pipeline = &snapshot.pipeline;
    println!("namecorpus Project Info");
    println!("=======================");
    println!("Name: {}", snapshot.name);
    println!("Root: {}", snapshot.root);
    println!("Config file: {}", snapshot.config_file);
    println!("Config version: {}", snapshot.config_version);
    println!("DB path: {} (schema v{})", snapshot.db_path, snapshot.schema_version);
    println!();
    println!("Pipeline:");
    println!("  Dialect: {}", pipeline.dialect);
    println!("  Keep strings: {}", pipeline.keep_strings);
    println!("  Keep calls: {}", pipeline.keep_calls);
    println!("  Numeric threshold: {}", pipeline.numeric_threshold);
    println!("  Host: {} (available: {})", pipeline.host, snapshot.available_hosts.join(", "));
    println!();
    println!("Directories:");
    print_dir_status("Meta dir (.namecorpus)", &layout.meta_dir);
    print_dir_status("Corpus dir", &layout.corpus_dir);
    print_dir_status("Models dir", &layout.models_dir);
    print_dir_status("Records dir", &layout.records_dir);
    println!();
    println!("Extraction runs: {}", snapshot.extraction_runs.len());
    println!("Corpus builds: {}", snapshot.corpus_builds.len());

    Ok(())
}

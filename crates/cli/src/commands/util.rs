use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;
use namecorpus_core::config::{load_pipeline_config, PipelineConfig};
use namecorpus_core::db::{load_project_config, ProjectLayout};

use crate::canonicalize_or_current;

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Resolve the pipeline configuration for commands that also work outside a
/// project: an explicit `--config` file wins, then the project's pipeline
/// section, then defaults. Returns the root relative paths resolve against.
pub fn resolve_pipeline(root: &str, config: Option<&str>) -> Result<(PathBuf, PipelineConfig)> {
    let root_path = canonicalize_or_current(root)?;
    if let Some(file) = config {
        let pipeline = load_pipeline_config(Path::new(file))?;
        return Ok((root_path, pipeline));
    }

    let layout = ProjectLayout::new(&root_path);
    if layout.project_config_path.is_file() {
        let project = load_project_config(&layout)?;
        return Ok((root_path, project.pipeline));
    }

    debug!("No project at {}, using default pipeline settings", root_path.display());
    Ok((root_path, PipelineConfig::default()))
}

/// Current time as an RFC-3339 UTC timestamp.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

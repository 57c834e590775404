use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::db::{ProjectConfig, ProjectDb, ProjectLayout};

/// Load `.namecorpus/project.json` for a given layout.
pub fn load_project_config(layout: &ProjectLayout) -> Result<ProjectConfig> {
    let path = &layout.project_config_path;
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read project config at {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse project config at {}", path.display()))
}

/// Resolve the DB path (relative paths are taken from the project root) and
/// open the database.
pub fn open_project_db(layout: &ProjectLayout) -> Result<(ProjectConfig, PathBuf, ProjectDb)> {
    let config = load_project_config(layout)?;
    let configured = Path::new(&config.db.path);
    let db_path = if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        layout.root.join(configured)
    };
    let db = ProjectDb::open(&db_path)
        .with_context(|| format!("Failed to open project database at {}", db_path.display()))?;
    Ok((config, db_path, db))
}

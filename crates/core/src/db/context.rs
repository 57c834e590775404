use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{resolve_path, PipelineConfig};
use crate::db::{open_project_db, ProjectConfig, ProjectDb, ProjectLayout};
use crate::names::Blocklist;
use crate::segmenter::Segmenter;

/// An opened project: layout, config, and database handle.
#[derive(Debug)]
pub struct ProjectContext {
    pub layout: ProjectLayout,
    pub config: ProjectConfig,
    pub db_path: PathBuf,
    pub db: ProjectDb,
}

impl ProjectContext {
    /// Load project config and open the database for a given root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = ProjectLayout::new(root);
        let (config, db_path, db) = open_project_db(&layout)?;
        Ok(Self { layout, config, db_path, db })
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.config.pipeline
    }

    /// Resolve a path relative to the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_path(&self.layout.root, path)
    }

    /// Load the segmenter configured for this project.
    pub fn load_segmenter(&self) -> Result<Segmenter> {
        self.pipeline()
            .load_segmenter(&self.layout.root)
            .context("Failed to load subword model or word list")
    }

    /// Load the meaningless-name blocklist (when filtering is enabled).
    pub fn load_blocklist(&self) -> Result<Option<Blocklist>> {
        self.pipeline().load_blocklist(&self.layout.root).context("Failed to load blocklist")
    }
}

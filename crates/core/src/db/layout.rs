use std::path::{Path, PathBuf};

/// Logical layout of a project on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// The CLI is responsible for actually creating directories and files based on
/// this layout.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    /// Directory for internal metadata (.namecorpus).
    pub meta_dir: PathBuf,
    /// Path to the project config file (JSON).
    pub project_config_path: PathBuf,
    pub db_path: PathBuf,
    /// Directory for written `src`/`tgt` corpus files.
    pub corpus_dir: PathBuf,
    /// Directory for the subword vocabulary, word list, and blocklist.
    pub models_dir: PathBuf,
    /// Directory scanned for extracted `<binary>.json` records by default.
    pub records_dir: PathBuf,
}

impl ProjectLayout {
    /// Compute the default layout for a project rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".namecorpus");
        let project_config_path = meta_dir.join("project.json");
        let db_path = meta_dir.join("project.db");
        let corpus_dir = root.join("corpus");
        let models_dir = root.join("models");
        let records_dir = root.join("records");

        Self { root, meta_dir, project_config_path, db_path, corpus_dir, models_dir, records_dir }
    }

    /// Database path suitable for storing in `ProjectConfig`, relative to
    /// `root` when possible.
    pub fn db_path_relative_string(&self) -> String {
        match self.db_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.db_path.to_string_lossy().to_string(),
        }
    }

    /// Corpus output directory for one split (`corpus/<split>`).
    pub fn split_dir(&self, split: &str) -> PathBuf {
        self.corpus_dir.join(split)
    }
}

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;

/// Database location, typically relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Serializable configuration describing a corpus project.
///
/// Lives at `.namecorpus/project.json` in the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-friendly project name.
    pub name: String,
    pub description: Option<String>,
    /// Version of the config format itself.
    pub config_version: String,
    pub db: DbConfig,
    /// Pipeline settings; older configs without this section get defaults.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            pipeline: PipelineConfig::default(),
        }
    }
}

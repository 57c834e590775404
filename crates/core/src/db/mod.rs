//! Project layout, configuration, and the SQLite bookkeeping database.
//!
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProjectConfig`: serializable project metadata plus the pipeline section.
//! - `ProjectDb`: a small SQLite wrapper recording extraction runs and corpus
//!   builds, with `PRAGMA user_version` migrations.

mod config;
mod context;
mod layout;
mod models;
mod project_db;
mod util;

pub use config::{DbConfig, ProjectConfig};
pub use context::ProjectContext;
pub use layout::ProjectLayout;
pub use models::{CorpusBuildRecord, ExtractionRunRecord, RunStatus};
pub use project_db::{DbError, DbResult, ProjectDb, CURRENT_SCHEMA_VERSION};
pub use util::{load_project_config, open_project_db};

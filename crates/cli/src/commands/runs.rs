use anyhow::{Context, Result};
use namecorpus_core::db::ProjectContext;

use crate::canonicalize_or_current;

/// List recorded extraction runs, optionally for one binary.
pub fn list_runs_command(root: &str, json: bool, binary: Option<&str>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let runs = ctx.db.list_extraction_runs(binary).context("Failed to list extraction runs")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("No extraction runs recorded.");
        return Ok(());
    }
    for run in &runs {
        println!(
            "{}  {:<9}  {:>5} functions  {}  [{}]",
            run.started_at,
            run.status.as_str(),
            run.functions,
            run.binary,
            run.host
        );
    }
    Ok(())
}

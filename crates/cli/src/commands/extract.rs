use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use namecorpus_core::db::{ExtractionRunRecord, ProjectContext, RunStatus};
use namecorpus_core::services::extract::is_sidecar_file;
use namecorpus_core::services::{default_host_registry, ExtractOutcome, Extractor};

use crate::commands::now_rfc3339;
use crate::{canonicalize_or_current, sha256_file};

/// Extract per-function records for each binary and record a run per binary.
///
/// A failure on one binary is logged and recorded; the remaining binaries are
/// still processed and the command fails at the end.
pub fn extract_command(root: &str, binaries: &[String], force: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let pipeline = ctx.pipeline();

    let registry = default_host_registry();
    let host = registry.get(&pipeline.host).ok_or_else(|| {
        anyhow!(
            "Unknown analysis host '{}' (available: {})",
            pipeline.host,
            registry.names().join(", ")
        )
    })?;

    let segmenter = ctx.load_segmenter()?;
    let blocklist = ctx.load_blocklist()?;
    let extractor =
        Extractor::new(&segmenter, pipeline, blocklist.as_ref(), host).with_force(force);

    let mut failures = 0usize;
    for binary in binaries {
        let binary_path = ctx.resolve(Path::new(binary));
        if is_sidecar_file(&binary_path) {
            info!("Skipping pipeline artifact {}", binary_path.display());
            continue;
        }

        let started_at = now_rfc3339();
        let binary_hash = sha256_file(&binary_path).ok();
        let result = extractor.extract_binary(&binary_path);

        let (status, functions) = match &result {
            Ok(ExtractOutcome::Extracted { functions, output, skipped }) => {
                println!(
                    "{}: {} functions -> {} ({} skipped)",
                    binary_path.display(),
                    functions,
                    output.display(),
                    skipped
                );
                (RunStatus::Succeeded, *functions as i64)
            }
            Ok(ExtractOutcome::AlreadyDone { output }) => {
                println!("{}: already extracted ({})", binary_path.display(), output.display());
                (RunStatus::Skipped, 0)
            }
            Ok(ExtractOutcome::MissingNameMap { expected }) => {
                println!("{}: missing name map {}", binary_path.display(), expected.display());
                (RunStatus::Skipped, 0)
            }
            Ok(ExtractOutcome::NoTextSection) => {
                println!("{}: no .text section", binary_path.display());
                (RunStatus::Skipped, 0)
            }
            Err(err) => {
                error!("{}: {err}", binary_path.display());
                failures += 1;
                (RunStatus::Failed, 0)
            }
        };

        let run = ExtractionRunRecord {
            binary: binary_path.display().to_string(),
            binary_hash,
            host: host.name().to_string(),
            status,
            functions,
            started_at,
            finished_at: now_rfc3339(),
        };
        ctx.db
            .insert_extraction_run(&run)
            .with_context(|| format!("Failed to record extraction run for {binary}"))?;
    }

    if failures > 0 {
        return Err(anyhow!("{failures} of {} binaries failed to extract", binaries.len()));
    }
    Ok(())
}

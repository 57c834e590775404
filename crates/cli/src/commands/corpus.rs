use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use namecorpus_core::corpus::{collect_record_files, load_records, CorpusBuilder};
use namecorpus_core::db::{CorpusBuildRecord, ProjectContext};

use crate::canonicalize_or_current;
use crate::commands::now_rfc3339;

/// Assemble aligned `src`/`tgt` files for one split from extracted records.
pub fn build_corpus_command(
    root: &str,
    records: Option<&str>,
    split: &str,
    out: Option<&str>,
    dedup: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let records_dir = match records {
        Some(dir) => ctx.resolve(Path::new(dir)),
        None => ctx.layout.records_dir.clone(),
    };
    let out_dir = match out {
        Some(dir) => ctx.resolve(Path::new(dir)),
        None => ctx.layout.split_dir(split),
    };

    let segmenter = ctx.load_segmenter()?;
    let files = collect_record_files(&records_dir)
        .with_context(|| format!("Failed to scan records in {}", records_dir.display()))?;
    if files.is_empty() {
        info!("No records files found under {}", records_dir.display());
    }

    let mut builder = CorpusBuilder::new(&segmenter).with_dedup(dedup);
    for file in &files {
        let records = load_records(file)?;
        builder.add_records(&records);
    }

    let stats = builder
        .write(&out_dir, split)
        .with_context(|| format!("Failed to write corpus to {}", out_dir.display()))?;

    let created_at = now_rfc3339();
    println!("Corpus split '{split}' from {} records files:", files.len());
    for stat in &stats {
        let record = CorpusBuildRecord {
            split: stat.split.clone(),
            representation: stat.representation.tag().to_string(),
            pairs: stat.pairs as i64,
            dropped: stat.dropped as i64,
            src_path: stat.src_path.display().to_string(),
            tgt_path: stat.tgt_path.display().to_string(),
            created_at: created_at.clone(),
        };
        ctx.db.insert_corpus_build(&record).context("Failed to record corpus build")?;
        println!(
            "  {:<12} {} pairs, {} dropped -> {}",
            record.representation,
            record.pairs,
            record.dropped,
            record.src_path
        );
    }
    Ok(())
}

use anyhow::{Context, Result};
use serde::Serialize;

use crate::commands::resolve_pipeline;

#[derive(Serialize)]
struct SegmentedEntry<'a> {
    name: &'a str,
    tokens: Vec<String>,
}

/// Segment identifiers into lower-case sub-tokens, one name per line.
pub fn segment_command(
    root: &str,
    config: Option<&str>,
    names: &[String],
    json: bool,
) -> Result<()> {
    let (root_path, pipeline) = resolve_pipeline(root, config)?;
    let segmenter = pipeline
        .load_segmenter(&root_path)
        .context("Failed to load subword model or word list")?;

    if json {
        let entries: Vec<SegmentedEntry<'_>> = names
            .iter()
            .map(|name| SegmentedEntry { name, tokens: segmenter.segment(name) })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for name in names {
        println!("{name}\t{}", segmenter.display_name(name));
    }
    Ok(())
}

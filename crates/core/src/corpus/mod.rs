//! Corpus assembly: extracted records in, aligned `src`/`tgt` text files out.
//!
//! For each representation, line *i* of `src-<split>-<tag>.txt` is the
//! rendered code of one function and line *i* of `tgt-<split>-<tag>.txt` is
//! its segmented name.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::{CorpusRecord, FunctionRecords, NormalizedInstruction, Representation};
use crate::segmenter::Segmenter;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse records file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type CorpusResult<T> = Result<T, CorpusError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CorpusError + '_ {
    move |source| CorpusError::Io { path: path.to_path_buf(), source }
}

/// Placeholders emitted by the classifier are kept as-is in call targets.
fn is_placeholder(token: &str) -> bool {
    token.len() > 2 && token.starts_with('<') && token.ends_with('>')
}

fn render_call(segmenter: &Segmenter, inst: &NormalizedInstruction) -> String {
    let callee = match inst.get(2).map(|t| t.trim()) {
        Some(callee) if is_placeholder(callee) => callee.to_string(),
        Some(callee) => segmenter.display_name(callee),
        None => String::new(),
    };
    if callee.is_empty() {
        "call".to_string()
    } else {
        format!("call {callee}")
    }
}

fn render_plain(inst: &NormalizedInstruction) -> String {
    inst.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect::<Vec<_>>().join(" ")
}

fn join_nonempty(parts: impl Iterator<Item = String>) -> String {
    parts.filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Native instructions; `call <target>` has its target segmented.
pub fn render_instructions(
    segmenter: &Segmenter,
    instructions: &[NormalizedInstruction],
) -> String {
    join_nonempty(instructions.iter().map(|inst| match inst.first().map(String::as_str) {
        Some("call") => render_call(segmenter, inst),
        _ => render_plain(inst),
    }))
}

/// Low-level IR; calls as for instructions, `if` conditions joined verbatim.
pub fn render_llil(segmenter: &Segmenter, llils: &[NormalizedInstruction]) -> String {
    join_nonempty(llils.iter().map(|inst| match inst.first().map(String::as_str) {
        Some("call") => render_call(segmenter, inst),
        Some(head) if head.starts_with("if") => inst.join(" "),
        _ => render_plain(inst),
    }))
}

pub fn render_mlil(mlils: &[NormalizedInstruction]) -> String {
    join_nonempty(mlils.iter().map(render_plain))
}

pub fn render_pseudo_code(tokens: &[String]) -> String {
    tokens.join(" ")
}

pub fn render_target(segmenter: &Segmenter, name: &str) -> String {
    segmenter.display_name(name)
}

/// Render one record's source line for a representation.
pub fn render_source(
    segmenter: &Segmenter,
    record: &CorpusRecord,
    representation: Representation,
) -> String {
    match representation {
        Representation::Instructions => render_instructions(segmenter, &record.instructions),
        Representation::Llil => render_llil(segmenter, &record.llils),
        Representation::Mlil => render_mlil(&record.mlils),
        Representation::PseudoCode => render_pseudo_code(&record.pseudo_code),
    }
}

/// Summary of one written `src`/`tgt` file pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub split: String,
    pub representation: Representation,
    pub pairs: usize,
    pub dropped: usize,
    pub src_path: PathBuf,
    pub tgt_path: PathBuf,
}

#[derive(Debug, Default)]
struct Lane {
    sources: Vec<String>,
    targets: Vec<String>,
    seen: HashSet<String>,
    dropped: usize,
}

/// Accumulates aligned source/target lines for all four representations.
#[derive(Debug)]
pub struct CorpusBuilder<'a> {
    segmenter: &'a Segmenter,
    dedup: bool,
    lanes: HashMap<Representation, Lane>,
}

impl<'a> CorpusBuilder<'a> {
    pub fn new(segmenter: &'a Segmenter) -> Self {
        Self { segmenter, dedup: false, lanes: HashMap::new() }
    }

    /// Drop repeated (source, target) pairs within each representation.
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn add_record(&mut self, record: &CorpusRecord) {
        let target = render_target(self.segmenter, &record.name);
        for representation in Representation::ALL {
            let lane = self.lanes.entry(representation).or_default();
            if target.is_empty() {
                lane.dropped += 1;
                continue;
            }
            let source = render_source(self.segmenter, record, representation);
            if self.dedup && !lane.seen.insert(pair_digest(&source, &target)) {
                lane.dropped += 1;
                continue;
            }
            lane.sources.push(source);
            lane.targets.push(target.clone());
        }
    }

    pub fn add_records(&mut self, records: &FunctionRecords) {
        for record in records.values() {
            self.add_record(record);
        }
    }

    /// Aligned `(source, target)` pairs accumulated for a representation.
    pub fn pairs(&self, representation: Representation) -> Vec<(&str, &str)> {
        let Some(lane) = self.lanes.get(&representation) else {
            return Vec::new();
        };
        lane.sources.iter().zip(&lane.targets).map(|(s, t)| (s.as_str(), t.as_str())).collect()
    }

    pub fn dropped(&self, representation: Representation) -> usize {
        self.lanes.get(&representation).map(|lane| lane.dropped).unwrap_or(0)
    }

    /// Write `src-<split>-<tag>.txt` and `tgt-<split>-<tag>.txt` for every
    /// representation into `dir`, creating it when needed.
    pub fn write(&self, dir: &Path, split: &str) -> CorpusResult<Vec<CorpusStats>> {
        fs::create_dir_all(dir).map_err(io_error(dir))?;

        let mut stats = Vec::with_capacity(Representation::ALL.len());
        for representation in Representation::ALL {
            let tag = representation.tag();
            let src_path = dir.join(format!("src-{split}-{tag}.txt"));
            let tgt_path = dir.join(format!("tgt-{split}-{tag}.txt"));

            let (sources, targets, dropped) = match self.lanes.get(&representation) {
                Some(lane) => (lane.sources.as_slice(), lane.targets.as_slice(), lane.dropped),
                None => (&[][..], &[][..], 0),
            };
            fs::write(&src_path, to_lines(sources)).map_err(io_error(&src_path))?;
            fs::write(&tgt_path, to_lines(targets)).map_err(io_error(&tgt_path))?;
            info!("Wrote {} pairs to {} ({} dropped)", sources.len(), src_path.display(), dropped);

            stats.push(CorpusStats {
                split: split.to_string(),
                representation,
                pairs: sources.len(),
                dropped,
                src_path,
                tgt_path,
            });
        }
        Ok(stats)
    }
}

fn to_lines(lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn pair_digest(source: &str, target: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(target.as_bytes());
    hasher.update(b"|");
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Read one `<binary>.json` records file.
pub fn load_records(path: &Path) -> CorpusResult<FunctionRecords> {
    let bytes = fs::read(path).map_err(io_error(path))?;
    serde_json::from_slice(&bytes)
        .map_err(|source| CorpusError::Parse { path: path.to_path_buf(), source })
}

/// Recursively collect extracted records files (`*.json`, excluding host
/// dumps `*.dump.json`) under `dir`, sorted by path.
pub fn collect_record_files(dir: &Path) -> CorpusResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).map_err(io_error(&current))? {
            let entry = entry.map_err(io_error(&current))?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name.ends_with(".json") && !name.ends_with(".dump.json") {
                files.push(path);
            }
        }
    }
    files.sort();
    debug!("Found {} records files under {}", files.len(), dir.display());
    Ok(files)
}

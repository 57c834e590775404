use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::lexer::{mask_function_name, Tokenizer};
use crate::model::{
    address_key, AddrRange, AddressContext, CorpusRecord, FunctionRecords, SymbolTable,
};
use crate::names::{load_name_map, Blocklist, NameFilter, NameMapError};
use crate::normalizer::Normalizer;
use crate::segmenter::Segmenter;
use crate::services::host::{sidecar_path, AnalysisHost, HostError, HostFunction};

/// Suffix of the persisted address/name map next to each binary.
pub const NAME_MAP_SUFFIX: &str = "name_and_addr";
/// Suffix of the extracted per-function records next to each binary.
pub const RECORDS_SUFFIX: &str = "json";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    NameMap(#[from] NameMapError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("Failed to serialize records for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of extracting one binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A non-empty records file already exists; nothing was done.
    AlreadyDone { output: PathBuf },
    /// The binary has no name map next to it; nothing was written.
    MissingNameMap { expected: PathBuf },
    /// The host reported no `.text` section; nothing was written.
    NoTextSection,
    Extracted { functions: usize, skipped: usize, output: PathBuf },
}

/// True for files that are pipeline artifacts rather than binaries.
pub fn is_sidecar_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    [NAME_MAP_SUFFIX, RECORDS_SUFFIX, "bndb"].iter().any(|suffix| {
        name.strip_suffix(suffix).is_some_and(|stem| stem.ends_with('.'))
    })
}

pub fn records_path(binary: &Path) -> PathBuf {
    sidecar_path(binary, RECORDS_SUFFIX)
}

pub fn name_map_path(binary: &Path) -> PathBuf {
    sidecar_path(binary, NAME_MAP_SUFFIX)
}

/// Per-binary driver: host dump in, `<binary>.json` records out.
pub struct Extractor<'a> {
    segmenter: &'a Segmenter,
    config: &'a PipelineConfig,
    blocklist: Option<&'a Blocklist>,
    host: &'a dyn AnalysisHost,
    force: bool,
}

impl<'a> Extractor<'a> {
    pub fn new(
        segmenter: &'a Segmenter,
        config: &'a PipelineConfig,
        blocklist: Option<&'a Blocklist>,
        host: &'a dyn AnalysisHost,
    ) -> Self {
        Self { segmenter, config, blocklist, host, force: false }
    }

    /// Re-extract even when a records file already exists.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn extract_binary(&self, binary: &Path) -> Result<ExtractOutcome, ExtractError> {
        let output = records_path(binary);
        if !self.force && fs::metadata(&output).map(|m| m.len() > 0).unwrap_or(false) {
            debug!("{} already exists", output.display());
            return Ok(ExtractOutcome::AlreadyDone { output });
        }

        let name_map = name_map_path(binary);
        if !name_map.is_file() {
            warn!("{} does not exist, skipping {}", name_map.display(), binary.display());
            return Ok(ExtractOutcome::MissingNameMap { expected: name_map });
        }
        let filter =
            NameFilter { blocklist: self.blocklist, method_names: self.config.method_names };
        let names = load_name_map(&name_map, filter)?;

        let dump = self.host.load(binary)?;
        let Some(section) = dump.text_section else {
            warn!("{} has no .text section", binary.display());
            return Ok(ExtractOutcome::NoTextSection);
        };

        let symbols: SymbolTable = dump
            .symbols
            .iter()
            .map(|sym| (sym.address, self.segmenter.display_name(&sym.full_name)))
            .collect();
        let raw_names: SymbolTable =
            dump.symbols.iter().map(|sym| (sym.address, sym.full_name.clone())).collect();

        let mut functions = dump.functions;
        functions.sort_by_key(|f| (f.lowest_address, f.highest_address));

        let normalizer = Normalizer::new(i128::from(self.config.numeric_threshold));
        let tokenizer = Tokenizer::new(self.segmenter, self.config.tokenizer_options());
        let total = functions.len();
        let mut retained: Vec<AddrRange> = Vec::new();
        let mut records = FunctionRecords::new();

        for function in functions {
            let range = function.range();
            if !section.encloses(&range) {
                continue;
            }
            let Some(name) = names.get(&function.lowest_address) else {
                continue;
            };
            if function.analysis_skipped {
                debug!("analysis skipped for {name} at {:#x}", range.start);
                continue;
            }
            if retained.iter().any(|kept| kept.overlaps(&range)) {
                debug!("{name} at {:#x} overlaps a retained function", range.start);
                continue;
            }

            let raw_name = raw_names.get(&function.lowest_address).map(String::as_str);
            let ctx = AddressContext::new(range, section, &symbols);
            let Some(record) =
                self.build_record(function, name, raw_name, &ctx, &normalizer, &tokenizer)
            else {
                continue;
            };
            retained.push(range);
            records.insert(record.addr.clone(), record);
        }

        let json = serde_json::to_string_pretty(&records)
            .map_err(|source| ExtractError::Serialize { path: output.clone(), source })?;
        fs::write(&output, json)
            .map_err(|source| ExtractError::Io { path: output.clone(), source })?;

        let functions = records.len();
        let skipped = total - functions;
        info!("Saved {} ({} functions, {} skipped)", output.display(), functions, skipped);
        Ok(ExtractOutcome::Extracted { functions, skipped, output })
    }

    fn build_record(
        &self,
        function: HostFunction,
        name: &str,
        raw_name: Option<&str>,
        ctx: &AddressContext<'_>,
        normalizer: &Normalizer,
        tokenizer: &Tokenizer<'_>,
    ) -> Option<CorpusRecord> {
        let range = function.range();
        let (streams, pseudo_code) = function.into_streams();
        let Some(source) = pseudo_code else {
            debug!("decompilation failed for {name} at {:#x}", range.start);
            return None;
        };

        let mut masked = mask_function_name(&source, name);
        if let Some(raw) = raw_name.filter(|raw| *raw != name) {
            masked = mask_function_name(&masked, raw);
        }
        let pseudo_code = match tokenizer.tokenize(&masked) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!("skipping {name} at {:#x}: {err}", range.start);
                return None;
            }
        };

        let normalized = normalizer.normalize(&streams, ctx);
        Some(CorpusRecord {
            start_addr: range.start,
            addr: address_key(range.start, range.end),
            name: name.to_string(),
            instructions: normalized.instructions,
            llils: normalized.llils,
            mlils: normalized.mlils,
            pseudo_code,
        })
    }
}

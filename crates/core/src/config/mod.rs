//! Pipeline configuration shared by extraction, tokenization, and corpus building.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::lexer::{Dialect, TokenizerOptions};
use crate::names::{Blocklist, NameMapError};
use crate::segmenter::{ModelError, Segmenter};

/// Name of the default host adapter.
pub const DEFAULT_HOST: &str = "json-dump";

/// Every tunable of the pipeline. Constructed once and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default = "default_true")]
    pub keep_strings: bool,
    #[serde(default = "default_true")]
    pub keep_calls: bool,
    /// Integers greater than this are abstracted to `<NUM>`.
    #[serde(default)]
    pub numeric_threshold: i64,
    /// SentencePiece `.vocab` file (`piece<TAB>score` per line).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subword_vocab: Option<PathBuf>,
    /// Dictionary words, one per line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_list: Option<PathBuf>,
    /// Meaningless function-name prefixes, one per line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocklist: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub filter_meaningless: bool,
    /// Reduce demangled C++ signatures to the bare method name.
    #[serde(default = "default_true")]
    pub method_names: bool,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            keep_strings: true,
            keep_calls: true,
            numeric_threshold: 0,
            subword_vocab: None,
            word_list: None,
            blocklist: None,
            filter_meaningless: true,
            method_names: true,
            host: default_host(),
        }
    }
}

impl PipelineConfig {
    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            dialect: self.dialect,
            keep_strings: self.keep_strings,
            keep_calls: self.keep_calls,
        }
    }

    /// Load the segmenter, resolving relative resource paths against `root`.
    pub fn load_segmenter(&self, root: &Path) -> Result<Segmenter, ModelError> {
        let subword_vocab = self.subword_vocab.as_deref().map(|p| resolve_path(root, p));
        let word_list = self.word_list.as_deref().map(|p| resolve_path(root, p));
        Segmenter::from_paths(subword_vocab.as_deref(), word_list.as_deref())
    }

    /// Load the blocklist when filtering is enabled.
    ///
    /// Filtering with no blocklist file configured still applies the
    /// anonymous/mangled-name rejection, so an empty list is returned.
    pub fn load_blocklist(&self, root: &Path) -> Result<Option<Blocklist>, NameMapError> {
        if !self.filter_meaningless {
            return Ok(None);
        }
        match self.blocklist.as_deref() {
            Some(path) => Blocklist::from_file(&resolve_path(root, path)).map(Some),
            None => Ok(Some(Blocklist::default())),
        }
    }
}

/// `path` itself when absolute, else `root.join(path)`.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Load a standalone pipeline file. `.json` is parsed as JSON, anything else
/// as YAML.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read pipeline config at {}", path.display()))?;
    let config = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_slice(&bytes).context("Failed to parse pipeline config JSON")?
    } else {
        serde_yaml::from_slice(&bytes).context("Failed to parse pipeline config YAML")?
    };
    Ok(config)
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DEFAULT_HOST;
use crate::model::{AddrRange, RawToken};
use crate::normalizer::FunctionStreams;

/// A symbol the host resolved for a concrete address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSymbol {
    pub address: u64,
    pub full_name: String,
}

/// One analyzed function as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFunction {
    pub lowest_address: u64,
    pub highest_address: u64,
    #[serde(default)]
    pub analysis_skipped: bool,
    #[serde(default)]
    pub instructions: Vec<Vec<RawToken>>,
    #[serde(default)]
    pub llil: Vec<Vec<RawToken>>,
    #[serde(default)]
    pub mlil: Vec<Vec<RawToken>>,
    /// Decompiled pseudo-source; `None` when decompilation failed.
    #[serde(default)]
    pub pseudo_code: Option<String>,
}

impl HostFunction {
    pub fn range(&self) -> AddrRange {
        AddrRange::new(self.lowest_address, self.highest_address)
    }

    /// Split into the normalizer's input streams and the pseudo-source.
    pub fn into_streams(self) -> (FunctionStreams, Option<String>) {
        let streams =
            FunctionStreams { instructions: self.instructions, llil: self.llil, mlil: self.mlil };
        (streams, self.pseudo_code)
    }
}

/// Everything the pipeline needs from an analysis host for one binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDump {
    /// Bounds of the `.text` section; `None` when the binary has none.
    #[serde(default)]
    pub text_section: Option<AddrRange>,
    #[serde(default)]
    pub symbols: Vec<HostSymbol>,
    #[serde(default)]
    pub functions: Vec<HostFunction>,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("No host dump for {} (expected {})", binary.display(), dump.display())]
    MissingDump { binary: PathBuf, dump: PathBuf },
    #[error("Failed to read host dump {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse host dump {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Trait implemented by analysis hosts; callers select by name.
pub trait AnalysisHost: Send + Sync {
    fn load(&self, binary: &Path) -> Result<HostDump, HostError>;
    fn name(&self) -> &'static str;
}

/// Reads a pre-exported `<binary>.dump.json` next to the binary.
pub struct JsonDumpHost;

impl JsonDumpHost {
    pub fn dump_path(binary: &Path) -> PathBuf {
        sidecar_path(binary, "dump.json")
    }
}

impl AnalysisHost for JsonDumpHost {
    fn load(&self, binary: &Path) -> Result<HostDump, HostError> {
        let dump = Self::dump_path(binary);
        if !dump.is_file() {
            return Err(HostError::MissingDump { binary: binary.to_path_buf(), dump });
        }
        let bytes =
            fs::read(&dump).map_err(|source| HostError::Io { path: dump.clone(), source })?;
        serde_json::from_slice(&bytes).map_err(|source| HostError::Parse { path: dump, source })
    }

    fn name(&self) -> &'static str {
        DEFAULT_HOST
    }
}

/// `<binary>.<suffix>`, keeping the binary's own extension.
pub fn sidecar_path(binary: &Path, suffix: &str) -> PathBuf {
    let mut name = binary.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Registry for analysis hosts.
#[derive(Default)]
pub struct HostRegistry {
    hosts: HashMap<String, Box<dyn AnalysisHost>>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self { hosts: HashMap::new() }
    }

    pub fn register<H: AnalysisHost + 'static>(&mut self, host: H) -> &mut Self {
        self.hosts.insert(host.name().to_string(), Box::new(host));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn AnalysisHost> {
        self.hosts.get(name).map(|h| &**h)
    }

    /// Sorted host names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.hosts.keys().cloned().collect();
        keys.sort();
        keys
    }
}

pub fn default_host_registry() -> HostRegistry {
    let mut registry = HostRegistry::new();
    registry.register(JsonDumpHost);
    registry
}

use serde::{Deserialize, Serialize};

/// Outcome recorded for one extraction attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Succeeded,
    /// Nothing to do: output already present, no name map, or no text section.
    Skipped,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Succeeded => "succeeded",
            RunStatus::Skipped => "skipped",
            RunStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "succeeded" => Ok(RunStatus::Succeeded),
            "skipped" => Ok(RunStatus::Skipped),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!("Unknown run status '{other}'")),
        }
    }
}

/// One `extract` attempt on one binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionRunRecord {
    pub binary: String,
    /// SHA-256 of the binary, when it could be read.
    pub binary_hash: Option<String>,
    pub host: String,
    pub status: RunStatus,
    /// Functions written to the records file.
    pub functions: i64,
    pub started_at: String,
    pub finished_at: String,
}

/// One written `src`/`tgt` file pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusBuildRecord {
    pub split: String,
    /// Corpus tag (`inst`, `llil`, `mlil`, `pc`).
    pub representation: String,
    pub pairs: i64,
    pub dropped: i64,
    pub src_path: String,
    pub tgt_path: String,
    pub created_at: String,
}

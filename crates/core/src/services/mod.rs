//! Services that drive the pipeline against an analysis host.
//!
//! - `host`: the host interface and the JSON dump adapter.
//! - `extract`: per-binary extraction into `<binary>.json` records.

pub mod extract;
pub mod host;

pub use extract::{ExtractError, ExtractOutcome, Extractor};
pub use host::{
    default_host_registry, AnalysisHost, HostDump, HostError, HostRegistry, JsonDumpHost,
};

//! Core data model for tokens, address contexts, and corpus records.
//!
//! Raw tokens and address contexts are ephemeral: they are built per function
//! by the host adapter and discarded once a normalized instruction has been
//! produced. `CorpusRecord` is what gets persisted.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Kind of a token produced by the upstream analysis host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    CodeRelativeAddress,
    PossibleAddress,
    Integer,
    String,
    NameFunction,
    NameVariable,
    NameRegister,
    NameLabel,
    NameCondition,
    NameOther,
    Operator,
    Comment,
    Whitespace,
    Other,
}

impl TokenKind {
    /// True for both address kinds (code-relative and possible address).
    pub fn is_address_like(self) -> bool {
        matches!(self, TokenKind::CodeRelativeAddress | TokenKind::PossibleAddress)
    }
}

/// One token of an instruction as reported by the host.
///
/// `value` is only present for numeric and address kinds. It is wide enough to
/// hold both unsigned 64-bit addresses and signed 64-bit immediates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    pub kind: TokenKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i128>,
}

impl RawToken {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into(), value: None }
    }

    /// Builder-style helper to attach a numeric value.
    pub fn with_value(mut self, value: i128) -> Self {
        self.value = Some(value);
        self
    }
}

/// Inclusive address range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddrRange {
    pub start: u64,
    pub end: u64,
}

impl AddrRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, addr: u64) -> bool {
        self.start <= addr && addr <= self.end
    }

    /// True when `other` lies entirely inside this range.
    pub fn encloses(&self, other: &AddrRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &AddrRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Concrete address → pre-segmented, space-joined display name.
pub type SymbolTable = HashMap<u64, String>;

/// Per-function address bundle used by the classifier.
///
/// Constructed once per function before normalization and never mutated
/// while normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressContext<'a> {
    pub function: AddrRange,
    pub section: AddrRange,
    pub symbols: &'a SymbolTable,
}

impl<'a> AddressContext<'a> {
    pub fn new(function: AddrRange, section: AddrRange, symbols: &'a SymbolTable) -> Self {
        Self { function, section, symbols }
    }
}

/// Output strings for one instruction, one per input token, in input order.
pub type NormalizedInstruction = Vec<String>;

/// Lower-case sub-tokens of one identifier.
pub type SegmentedName = Vec<String>;

/// The four code representations a corpus is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    Instructions,
    Llil,
    Mlil,
    PseudoCode,
}

impl Representation {
    pub const ALL: [Representation; 4] = [
        Representation::Instructions,
        Representation::Llil,
        Representation::Mlil,
        Representation::PseudoCode,
    ];

    /// Short tag used in corpus file names (`src-<split>-<tag>.txt`).
    pub fn tag(self) -> &'static str {
        match self {
            Representation::Instructions => "inst",
            Representation::Llil => "llil",
            Representation::Mlil => "mlil",
            Representation::PseudoCode => "pc",
        }
    }
}

/// Build the `"<low>_<high>"` key identifying a function within one binary.
pub fn address_key(low: u64, high: u64) -> String {
    format!("{low}_{high}")
}

/// One training example, serialized as the per-function JSON record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub start_addr: u64,
    pub addr: String,
    pub name: String,
    pub instructions: Vec<NormalizedInstruction>,
    pub llils: Vec<NormalizedInstruction>,
    pub mlils: Vec<NormalizedInstruction>,
    pub pseudo_code: Vec<String>,
}

/// All records extracted from one binary, keyed by `addr`.
pub type FunctionRecords = BTreeMap<String, CorpusRecord>;

//! Function-name filtering and the persisted address/name map.
//!
//! The name map is produced upstream (one per binary, next to it as
//! `<binary>.name_and_addr`) and maps each demangled function name to its
//! `[start, end]` address pair.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Error type for name-map and blocklist loading.
#[derive(Debug, Error)]
pub enum NameMapError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse name map {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Prefixes of compiler- or runtime-generated function names that carry no
/// useful naming signal (`_init`, `__libc_csu`, `deregister_tm_clones`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    entries: Vec<String>,
}

impl Blocklist {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(Into::into)
            .map(|e: String| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self { entries }
    }

    /// One prefix per line; blank lines are ignored.
    pub fn from_file(path: &Path) -> Result<Self, NameMapError> {
        let text = fs::read_to_string(path)
            .map_err(|source| NameMapError::Io { path: path.to_path_buf(), source })?;
        Ok(Self::from_entries(text.lines()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// False when `name` equals or starts with any entry.
    pub fn is_meaningful(&self, name: &str) -> bool {
        !self.entries.iter().any(|entry| name.starts_with(entry.as_str()))
    }
}

/// Rejects anonymous (`sub_...`), raw Itanium-mangled (`_ZN...`) and
/// bracketed (`_[...`) names.
pub fn is_required_name(name: &str) -> bool {
    !(name.starts_with("sub_") || name.starts_with("_ZN") || name.starts_with("_["))
}

/// A demangled C++ signature such as `ns::Foo::bar(int) const`.
pub fn is_cplusplus_signature(name: &str) -> bool {
    name.contains('(') && name.contains(')')
}

static TEMPLATE_ARGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid template regex"));
static PARAMETER_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^()]*\)").expect("valid parameter regex"));
static BRACKET_NOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\[\]]*\]").expect("valid bracket regex"));
static BACKTICK_NOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`']*'").expect("valid backtick regex"));

/// Remove innermost matches of `pattern` until none are left.
fn strip_nested(mut text: String, pattern: &Regex) -> String {
    while pattern.is_match(&text) {
        text = pattern.replace_all(&text, "").into_owned();
    }
    text
}

/// Reduce a demangled C++ signature to its bare method name.
///
/// `std::vector<int>::push_back(int const&)` becomes `push_back`, and
/// `Foo::~Foo()` becomes `Foo`. Returns `None` when the signature has no
/// closing parenthesis after its last `:` or nothing alphabetic remains.
pub fn method_name(signature: &str) -> Option<String> {
    let close = signature.rfind(')')?;
    if signature[close..].contains(':') {
        return None;
    }
    let mut method = signature[..=close].to_string();

    method = strip_nested(method, &TEMPLATE_ARGS);
    method = strip_nested(method, &PARAMETER_LIST);
    method = strip_nested(method, &BRACKET_NOTE);
    method = strip_nested(method, &BACKTICK_NOTE);

    let method = match method.rsplit_once("::") {
        Some((_, last)) => last.split(' ').next().unwrap_or_default().to_string(),
        None => method.rsplit(' ').next().unwrap_or_default().to_string(),
    };
    if !method.chars().any(char::is_alphabetic) {
        return None;
    }
    let method = method.trim_end_matches('*');
    let method = method.strip_prefix('~').unwrap_or(method);
    Some(method.to_string())
}

/// How `load_name_map` filters and rewrites names.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameFilter<'a> {
    /// Drop names the blocklist marks as meaningless, and names rejected by
    /// [`is_required_name`].
    pub blocklist: Option<&'a Blocklist>,
    /// Reduce C++ signatures to their method name.
    pub method_names: bool,
}

/// Load a `name -> [start, end]` JSON map and re-key it by start address.
pub fn load_name_map(
    path: &Path,
    filter: NameFilter<'_>,
) -> Result<BTreeMap<u64, String>, NameMapError> {
    let text = fs::read_to_string(path)
        .map_err(|source| NameMapError::Io { path: path.to_path_buf(), source })?;
    let raw: BTreeMap<String, [u64; 2]> = serde_json::from_str(&text)
        .map_err(|source| NameMapError::Parse { path: path.to_path_buf(), source })?;

    let total = raw.len();
    let mut by_start = BTreeMap::new();
    for (name, [start, _end]) in raw {
        if let Some(blocklist) = filter.blocklist {
            if !blocklist.is_meaningful(&name) || !is_required_name(&name) {
                continue;
            }
        }
        let name = if filter.method_names && is_cplusplus_signature(&name) {
            match method_name(&name) {
                Some(method) => method,
                None => continue,
            }
        } else {
            name
        };
        by_start.insert(start, name);
    }

    debug!("Loaded {} of {} names from {}", by_start.len(), total, path.display());
    Ok(by_start)
}

//! Identifier segmentation: splits compiled symbol names into lower-case
//! sub-tokens that line up with the target-side vocabulary.
//!
//! The pipeline is:
//! 1. non-alphabetic characters become separators,
//! 2. maximal uppercase runs are kept together as acronyms,
//! 3. remaining pieces are split on camel-case boundaries,
//! 4. every piece is run through a subword model,
//! 5. a single suffix-merge pass glues a trailing suffix back onto its stem.
//!
//! The model and the dictionary are loaded once and owned by [`Segmenter`];
//! segmenting never touches the filesystem.

mod subword;
mod vocabulary;

use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::model::SegmentedName;

pub use subword::{PassthroughModel, SubwordModel, UnigramModel, WORD_START};
pub use vocabulary::Vocabulary;

/// Separator used while splitting; every non-alphabetic character maps to it.
const SEPARATOR: char = '_';

/// Closed list of suffixes merged back onto the preceding piece.
pub const SUFFIXES: [&str; 25] = [
    "er", "or", "ed", "ied", "ing", "ling", "est", "s", "es", "ies", "ify", "ified", "ly", "ible",
    "able", "ize", "al", "tion", "ition", "ous", "ance", "ence", "ful", "ment", "hood",
];

/// Ordered (stem ending, piece ending) pairs that also trigger a merge.
pub const CONDITIONAL_SUFFIXES: [(&str, &str); 3] = [("t", "ion"), ("e", "d"), ("e", "r")];

/// Errors raised while loading the subword model or the word list.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed subword vocabulary line {line} in {}: {content:?}", path.display())]
    MalformedVocabLine { path: PathBuf, line: usize, content: String },
}

/// Splits identifiers into sub-tokens using a subword model and a dictionary.
pub struct Segmenter {
    model: Box<dyn SubwordModel>,
    vocabulary: Vocabulary,
}

impl std::fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segmenter").field("vocabulary_words", &self.vocabulary.len()).finish()
    }
}

impl Segmenter {
    pub fn new(model: impl SubwordModel + 'static, vocabulary: Vocabulary) -> Self {
        Self { model: Box::new(model), vocabulary }
    }

    /// Segmenter with no subword model and an empty dictionary.
    ///
    /// Only steps 1-3 and the dictionary-independent merge rules take effect.
    pub fn passthrough() -> Self {
        Self::new(PassthroughModel, Vocabulary::default())
    }

    /// Load the subword model and dictionary from disk.
    ///
    /// Either path may be omitted, in which case the passthrough model or an
    /// empty dictionary is used instead.
    pub fn from_paths(
        subword_vocab: Option<&Path>,
        word_list: Option<&Path>,
    ) -> Result<Self, ModelError> {
        let vocabulary = match word_list {
            Some(path) => Vocabulary::from_file(path)?,
            None => Vocabulary::default(),
        };
        let segmenter = match subword_vocab {
            Some(path) => {
                let model = UnigramModel::from_vocab_file(path)?;
                debug!("loaded subword model with {} pieces from {}", model.len(), path.display());
                Self::new(model, vocabulary)
            }
            None => Self::new(PassthroughModel, vocabulary),
        };
        Ok(segmenter)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Segment one identifier into lower-case sub-tokens.
    ///
    /// An identifier without any alphabetic character yields an empty sequence.
    pub fn segment(&self, name: &str) -> SegmentedName {
        let words = split_identifier(name);
        let pieces = apply_subword_model(self.model.as_ref(), &words);
        merge_suffix(pieces, &self.vocabulary)
    }

    /// Space-joined segmentation, as used for symbol display names and targets.
    pub fn display_name(&self, name: &str) -> String {
        self.segment(name).join(" ")
    }
}

/// Steps 1-3: separator marking, acronym runs, and camel-case splitting.
pub fn split_identifier(name: &str) -> Vec<String> {
    let chars: Vec<char> =
        name.chars().map(|c| if c.is_alphabetic() { c } else { SEPARATOR }).collect();
    let upper: Vec<usize> =
        chars.iter().enumerate().filter(|(_, c)| c.is_uppercase()).map(|(i, _)| i).collect();

    let mut bounds = acronym_boundaries(&upper);
    if !bounds.contains(&chars.len()) {
        bounds.push(chars.len());
    }

    let mut tokens: Vec<String> = Vec::new();
    for window in bounds.windows(2) {
        let piece = &chars[window[0]..window[1]];
        if is_all_upper(piece) {
            tokens.push(
                piece.iter().filter(|c| **c != SEPARATOR).flat_map(|c| c.to_lowercase()).collect(),
            );
        } else {
            tokens.extend(split_camel_case(piece));
        }
    }
    tokens
}

/// Boundaries around every uppercase run longer than one letter.
///
/// `[6, 7, 8, 15, 22, 23, 24, 25]` becomes `[0, 6, 9, 22, 26]`: the start and
/// one-past-the-end of each run, always led by `0`. Single uppercase letters
/// contribute nothing here; camel-case splitting handles them later.
fn acronym_boundaries(upper: &[usize]) -> Vec<usize> {
    let mut bounds = vec![0];
    let mut left = 0;
    while left < upper.len() {
        let mut right = left;
        while right + 1 < upper.len() && upper[right] + 1 == upper[right + 1] {
            right += 1;
        }
        if right > left {
            if !bounds.contains(&upper[left]) {
                bounds.push(upper[left]);
            }
            bounds.push(upper[right] + 1);
        }
        left = right + 1;
    }
    bounds
}

/// At least one uppercase letter and no lowercase letter.
fn is_all_upper(piece: &[char]) -> bool {
    piece.iter().any(|c| c.is_uppercase()) && !piece.iter().any(|c| c.is_lowercase())
}

fn split_camel_case(piece: &[char]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for &c in piece {
        if c == SEPARATOR || c.is_uppercase() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if c == SEPARATOR {
                continue;
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Step 4: encode every word independently, strip the word-start marker, and
/// drop empty pieces.
pub fn apply_subword_model(model: &dyn SubwordModel, words: &[String]) -> Vec<String> {
    words
        .iter()
        .flat_map(|word| model.encode(word))
        .map(|piece| piece.replace(WORD_START, ""))
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Step 5: merge the final two pieces when the last one is a suffix.
///
/// Exactly one pass is made; a merge that produces a new stem eligible for a
/// second merge is left as is.
pub fn merge_suffix(mut pieces: Vec<String>, vocabulary: &Vocabulary) -> Vec<String> {
    let n = pieces.len();
    if n < 2 {
        return pieces;
    }

    let prev = &pieces[n - 2];
    let last = &pieces[n - 1];
    let merge = SUFFIXES.contains(&last.as_str())
        || CONDITIONAL_SUFFIXES.iter().any(|(p1, p2)| prev.ends_with(p1) && last.ends_with(p2))
        || (vocabulary.contains(prev)
            && !vocabulary.contains(last)
            && vocabulary.contains(&format!("{prev}{last}")));

    if merge {
        if let Some(last) = pieces.pop() {
            pieces[n - 2].push_str(&last);
        }
    }
    pieces
}

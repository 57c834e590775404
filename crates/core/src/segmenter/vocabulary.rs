use std::collections::HashSet;
use std::path::Path;

use super::ModelError;

/// Set of dictionary words consulted by the suffix-merge rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    words: HashSet<String>,
}

impl Vocabulary {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { words: words.into_iter().map(Into::into).collect() }
    }

    /// Load a one-word-per-line list; blank lines are skipped.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| ModelError::Io { path: path.to_path_buf(), source })?;
        Ok(Self::from_words(
            body.lines().map(str::trim).filter(|w| !w.is_empty()).map(str::to_string),
        ))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

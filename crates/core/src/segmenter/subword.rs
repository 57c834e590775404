use std::collections::HashMap;
use std::path::Path;

use super::ModelError;

/// Marker a subword model prefixes to the first piece of every word.
pub const WORD_START: char = '\u{2581}';

/// Control pieces present in SentencePiece vocabularies that never appear in
/// segmented output.
const CONTROL_PIECES: [&str; 4] = ["<unk>", "<s>", "</s>", "<pad>"];

/// Penalty applied below the lowest piece score for characters no piece covers.
const UNKNOWN_PENALTY: f64 = 10.0;

/// A pretrained statistical tokenizer splitting one word into pieces.
pub trait SubwordModel: Send + Sync {
    /// Encode a single word. Pieces may carry [`WORD_START`].
    fn encode(&self, word: &str) -> Vec<String>;
}

/// Model that leaves every word whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughModel;

impl SubwordModel for PassthroughModel {
    fn encode(&self, word: &str) -> Vec<String> {
        if word.is_empty() {
            return Vec::new();
        }
        vec![format!("{WORD_START}{word}")]
    }
}

/// Unigram subword model read from a SentencePiece `.vocab` file.
///
/// Each line is `piece<TAB>log_probability`. Words are segmented with a
/// Viterbi search over the piece lattice of `▁word`.
#[derive(Debug, Clone)]
pub struct UnigramModel {
    pieces: HashMap<String, f64>,
    max_piece_chars: usize,
    unknown_score: f64,
}

impl UnigramModel {
    pub fn from_pieces<I, S>(pieces: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let pieces: HashMap<String, f64> = pieces
            .into_iter()
            .map(|(piece, score)| (piece.into(), score))
            .filter(|(piece, _)| !piece.is_empty() && !CONTROL_PIECES.contains(&piece.as_str()))
            .collect();
        let max_piece_chars = pieces.keys().map(|p| p.chars().count()).max().unwrap_or(1);
        let min_score = pieces.values().copied().fold(0.0_f64, f64::min);
        Self { pieces, max_piece_chars, unknown_score: min_score - UNKNOWN_PENALTY }
    }

    pub fn from_vocab_file(path: &Path) -> Result<Self, ModelError> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| ModelError::Io { path: path.to_path_buf(), source })?;

        let mut pieces = Vec::new();
        for (idx, line) in body.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || ModelError::MalformedVocabLine {
                path: path.to_path_buf(),
                line: idx + 1,
                content: line.to_string(),
            };
            let (piece, score) = line.split_once('\t').ok_or_else(malformed)?;
            let score: f64 = score.trim().parse().map_err(|_| malformed())?;
            pieces.push((piece.to_string(), score));
        }
        Ok(Self::from_pieces(pieces))
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

impl SubwordModel for UnigramModel {
    fn encode(&self, word: &str) -> Vec<String> {
        if word.is_empty() {
            return Vec::new();
        }
        let text: Vec<char> = std::iter::once(WORD_START).chain(word.chars()).collect();
        let n = text.len();

        // best[end] = (score of best segmentation of text[..end], start of its last piece)
        let mut best: Vec<Option<(f64, usize)>> = vec![None; n + 1];
        best[0] = Some((0.0, 0));
        for end in 1..=n {
            for start in end.saturating_sub(self.max_piece_chars)..end {
                let Some((prefix_score, _)) = best[start] else {
                    continue;
                };
                let piece: String = text[start..end].iter().collect();
                let score = match self.pieces.get(&piece) {
                    Some(score) => *score,
                    None if end - start == 1 => self.unknown_score,
                    None => continue,
                };
                let candidate = prefix_score + score;
                if best[end].map_or(true, |(current, _)| candidate > current) {
                    best[end] = Some((candidate, start));
                }
            }
        }

        let mut out = Vec::new();
        let mut end = n;
        while end > 0 {
            let start = best[end].map_or(end - 1, |(_, start)| start);
            out.push(text[start..end].iter().collect());
            end = start;
        }
        out.reverse();
        out
    }
}

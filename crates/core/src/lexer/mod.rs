//! Lexer and tokenizer for decompiler-produced pseudo-C.
//!
//! Two dialects are supported. They share one engine and differ only in their
//! rule tables and in how identifier categories are rewritten:
//!
//! - `Decompiler`: Hex-Rays style output (`sub_401000`, `v4`, `a1`, `LABEL_7`,
//!   `_DWORD`). Call sites are lexed together with their open parenthesis.
//! - `AnalysisTool`: Binary Ninja style output (`var_18`, `rax_2`,
//!   `label_4010a0`, `cond:0`, `int32_t`). The first function name is the
//!   definition site and self-references are masked.

mod engine;
mod rules;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::segmenter::Segmenter;

pub use engine::{lex, Lexeme};
pub use rules::{is_anonymous_function, Category};

pub const FUNCTION_PLACEHOLDER: &str = "<FUNCTION>";
pub const NUMBER_PLACEHOLDER: &str = "<Number>";
pub const STRING_PLACEHOLDER: &str = "<STRING>";
pub const VARIABLE_PLACEHOLDER: &str = "<VARIBLE>";
pub const LABEL_PLACEHOLDER: &str = "<LABEL>";
pub const CONDITION_PLACEHOLDER: &str = "<CONDITION>";

/// Name substituted for a function's own name before tokenizing.
pub const ANONYMOUS_NAME: &str = "sub_0";

/// Prefixes the decompiler uses for synthetic argument (`a1`) and local
/// (`v4`) names.
const SYNTHETIC_NAME_PREFIXES: [char; 2] = ['a', 'v'];

/// Lexical rule set to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    #[default]
    Decompiler,
    AnalysisTool,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Decompiler => "decompiler",
            Dialect::AnalysisTool => "analysis-tool",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decompiler" => Ok(Dialect::Decompiler),
            "analysis-tool" => Ok(Dialect::AnalysisTool),
            other => {
                Err(format!("Unknown dialect '{other}' (expected 'decompiler' or 'analysis-tool')"))
            }
        }
    }
}

/// Tokenization failure. Aborts tokenization of the current input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// A lexeme category the active dialect has no rewrite rule for.
    #[error("Unrecognized token category {category:?} in {dialect} source: {text:?}")]
    Unrecognized { dialect: Dialect, category: Category, text: String },

    /// No lexer rule matched.
    #[error("No lexer rule matches at offset {offset}: {text:?}")]
    Unlexable { offset: usize, text: String },
}

/// Tokenizer switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerOptions {
    #[serde(default)]
    pub dialect: Dialect,
    /// When false every string literal becomes `<STRING>`.
    #[serde(default = "default_true")]
    pub keep_strings: bool,
    /// When false every resolved call target becomes `<FUNCTION>`.
    #[serde(default = "default_true")]
    pub keep_calls: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self { dialect: Dialect::Decompiler, keep_strings: true, keep_calls: true }
    }
}

impl TokenizerOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect, ..Self::default() }
    }
}

/// Turns pseudo-source text into a vocabulary-bounded token sequence.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'a> {
    segmenter: &'a Segmenter,
    options: TokenizerOptions,
}

/// Per-input state: the pending string literal and the definition name.
#[derive(Default)]
struct TokenizeState<'s> {
    pending_string: Option<String>,
    definition: Option<&'s str>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(segmenter: &'a Segmenter, options: TokenizerOptions) -> Self {
        Self { segmenter, options }
    }

    pub fn options(&self) -> TokenizerOptions {
        self.options
    }

    /// Tokenize one source unit (normally one function).
    pub fn tokenize(&self, source: &str) -> Result<Vec<String>, TokenizeError> {
        let lexemes = lex(source, self.options.dialect)?;
        let mut state = TokenizeState::default();
        let mut out = Vec::with_capacity(lexemes.len());

        for lexeme in lexemes {
            if lexeme.category != Category::String {
                if let Some(literal) = state.pending_string.take() {
                    out.push(self.render_string(&literal));
                }
            }
            if let Some(token) = self.render(&lexeme, &mut state)? {
                if !token.is_empty() {
                    out.push(token);
                }
            }
        }
        if let Some(literal) = state.pending_string.take() {
            out.push(self.render_string(&literal));
        }

        Ok(out)
    }

    fn render<'s>(
        &self,
        lexeme: &Lexeme<'s>,
        state: &mut TokenizeState<'s>,
    ) -> Result<Option<String>, TokenizeError> {
        let dialect = self.options.dialect;
        let text = lexeme.text;
        let token = match (lexeme.category, dialect) {
            (Category::String, _) => {
                state.pending_string.get_or_insert_with(String::new).push_str(text);
                return Ok(None);
            }
            (Category::Whitespace | Category::Comment | Category::ScopeOperator, _) => {
                return Ok(None);
            }
            (Category::Placeholder, _) => text.to_string(),
            (Category::Number, _) => {
                if text == "0" {
                    text.to_string()
                } else {
                    NUMBER_PLACEHOLDER.to_string()
                }
            }
            (Category::NameFunction, Dialect::Decompiler) => self.render_call_site(text),
            (Category::NameFunction, Dialect::AnalysisTool) => self.render_function(text, state),
            (Category::Name, Dialect::Decompiler) => {
                if text.starts_with(SYNTHETIC_NAME_PREFIXES) {
                    text.to_string()
                } else {
                    self.segmenter.display_name(text)
                }
            }
            (Category::Name, Dialect::AnalysisTool) => {
                if state.definition == Some(text) {
                    FUNCTION_PLACEHOLDER.to_string()
                } else {
                    self.segmenter.display_name(text)
                }
            }
            (Category::NameVariable, Dialect::AnalysisTool) => VARIABLE_PLACEHOLDER.to_string(),
            (Category::NameRegister, Dialect::AnalysisTool) => {
                text.split('_').next().unwrap_or(text).to_string()
            }
            (Category::NameLabel, Dialect::AnalysisTool) => LABEL_PLACEHOLDER.to_string(),
            (Category::NameCondition, Dialect::AnalysisTool) => CONDITION_PLACEHOLDER.to_string(),
            (
                Category::Keyword
                | Category::KeywordType
                | Category::Operator
                | Category::Punctuation
                | Category::Other,
                _,
            ) => text.trim().to_string(),
            (category, dialect) => {
                return Err(TokenizeError::Unrecognized {
                    dialect,
                    category,
                    text: text.to_string(),
                });
            }
        };
        Ok(Some(token))
    }

    /// Decompiler dialect: `name(` renders as the segmented name followed by `(`.
    fn render_call_site(&self, text: &str) -> String {
        let (name, is_call) = match text.strip_suffix('(') {
            Some(name) => (name, true),
            None => (text, false),
        };
        if is_anonymous_function(name) {
            return FUNCTION_PLACEHOLDER.to_string();
        }
        if !self.options.keep_calls {
            return format!("{FUNCTION_PLACEHOLDER} (");
        }
        let split = self.segmenter.display_name(name);
        match (is_call, split.is_empty()) {
            (true, true) => "(".to_string(),
            (true, false) => format!("{split} ("),
            (false, _) => split,
        }
    }

    /// Analysis-tool dialect: the first function name is the definition site;
    /// later references to it are masked as well.
    fn render_function<'s>(&self, name: &'s str, state: &mut TokenizeState<'s>) -> String {
        match state.definition {
            None => {
                state.definition = Some(name);
                FUNCTION_PLACEHOLDER.to_string()
            }
            Some(definition) if definition == name => FUNCTION_PLACEHOLDER.to_string(),
            Some(_) if is_anonymous_function(name) || !self.options.keep_calls => {
                FUNCTION_PLACEHOLDER.to_string()
            }
            Some(_) => self.segmenter.display_name(name),
        }
    }

    fn render_string(&self, literal: &str) -> String {
        if !self.options.keep_strings {
            return STRING_PLACEHOLDER.to_string();
        }
        let chars: Vec<char> = literal.chars().collect();
        let body: String = if chars.len() >= 2 {
            chars[1..chars.len() - 1].iter().collect()
        } else {
            String::new()
        };
        format!("\" {} \"", body.replace('_', " "))
    }
}

/// Replace whole-identifier occurrences of `name` with [`ANONYMOUS_NAME`] so a
/// function's own name never leaks into its source-side tokens.
pub fn mask_function_name(source: &str, name: &str) -> String {
    if name.is_empty() {
        return source.to_string();
    }
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';

    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut before_rest: Option<char> = None;
    while let Some(idx) = rest.find(name) {
        let before = rest[..idx].chars().next_back().or(if idx == 0 { before_rest } else { None });
        let tail = &rest[idx + name.len()..];
        let after = tail.chars().next();

        out.push_str(&rest[..idx]);
        if before.is_some_and(is_ident) || after.is_some_and(is_ident) {
            out.push_str(name);
        } else {
            out.push_str(ANONYMOUS_NAME);
        }
        before_rest = name.chars().next_back();
        rest = tail;
    }
    out.push_str(rest);
    out
}

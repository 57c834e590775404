use super::rules::{self, Category};
use super::{Dialect, TokenizeError};

/// A categorized slice of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub category: Category,
    pub text: &'a str,
    pub offset: usize,
}

/// Split `source` into lexemes using the dialect's rule table.
///
/// Fails with [`TokenizeError::Unlexable`] if no rule matches at some offset.
pub fn lex(source: &str, dialect: Dialect) -> Result<Vec<Lexeme<'_>>, TokenizeError> {
    let table = rules::table(dialect);
    let mut lexemes = Vec::new();
    let mut offset = 0;

    while offset < source.len() {
        let rest = &source[offset..];
        let matched = table
            .iter()
            .find_map(|rule| rule.match_len(rest).filter(|len| *len > 0).map(|len| (rule, len)));

        let Some((rule, len)) = matched else {
            let text = rest.chars().next().map(String::from).unwrap_or_default();
            return Err(TokenizeError::Unlexable { offset, text });
        };

        lexemes.push(Lexeme { category: rule.category, text: &rest[..len], offset });
        offset += len;
    }

    Ok(lexemes)
}

//! Address and number abstraction for host-provided instruction tokens.
//!
//! Addresses and large immediates are instance-specific; they are replaced by
//! placeholders unless a symbol name is known for them.

use crate::model::{AddressContext, RawToken, TokenKind};

/// Address inside the current function.
pub const LOCAL_ADDR: &str = "<LOCADDR>";
/// Address inside the text section but outside the current function.
pub const INTER_ADDR: &str = "<INTERADDR>";
/// Any other address.
pub const GENERIC_ADDR: &str = "<ADDR>";
/// Abstracted integer immediate.
pub const NUMBER: &str = "<NUM>";

/// Default threshold: only non-positive immediates are kept literal.
pub const DEFAULT_NUMERIC_THRESHOLD: i128 = 0;

/// Token-by-token classifier; see [`Classifier::classify`] for the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    numeric_threshold: i128,
    rewrite_strings: bool,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_NUMERIC_THRESHOLD)
    }
}

impl Classifier {
    pub fn new(numeric_threshold: i128) -> Self {
        Self { numeric_threshold, rewrite_strings: false }
    }

    /// Enable string-literal rewriting (used for the mid-level IR pass).
    pub fn with_string_rewrite(mut self, enabled: bool) -> Self {
        self.rewrite_strings = enabled;
        self
    }

    pub fn numeric_threshold(&self) -> i128 {
        self.numeric_threshold
    }

    /// Render one token.
    ///
    /// Rules, first match wins:
    /// 1. address-like: symbol name, else local / inter-procedural / generic
    ///    placeholder by range;
    /// 2. integer: literal when `value <= threshold`, else [`NUMBER`];
    /// 3. string (when enabled): quotes spaced out, underscores to spaces;
    /// 4. anything else: the token text unchanged.
    pub fn classify(&self, token: &RawToken, ctx: &AddressContext<'_>) -> String {
        match (token.kind, token.value) {
            (kind, Some(value)) if kind.is_address_like() => classify_address(value, ctx),
            (TokenKind::Integer, Some(value)) => {
                if value <= self.numeric_threshold {
                    token.text.clone()
                } else {
                    NUMBER.to_string()
                }
            }
            (TokenKind::String, _) if self.rewrite_strings => normalize_string_literal(&token.text),
            _ => token.text.clone(),
        }
    }
}

fn classify_address(value: i128, ctx: &AddressContext<'_>) -> String {
    let Ok(addr) = u64::try_from(value) else {
        return GENERIC_ADDR.to_string();
    };
    if let Some(name) = ctx.symbols.get(&addr) {
        name.clone()
    } else if ctx.function.contains(addr) {
        LOCAL_ADDR.to_string()
    } else if ctx.section.contains(addr) {
        INTER_ADDR.to_string()
    } else {
        GENERIC_ADDR.to_string()
    }
}

/// `"foo_bar"` becomes `" foo bar "` with the outer whitespace trimmed.
pub fn normalize_string_literal(text: &str) -> String {
    text.replace('"', " \" ").replace('_', " ").trim().to_string()
}

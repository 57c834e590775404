//! Declarative lexer rule tables, one per dialect.
//!
//! Each table is an ordered list of `pattern → category` rules; the first rule
//! matching at the current position wins. Compound operators come before the
//! single-character operator class so `a->b` lexes as `a`, `->`, `b`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Dialect;

/// Lexical category assigned to a lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A placeholder emitted by an earlier normalization pass.
    Placeholder,
    Whitespace,
    Comment,
    String,
    Number,
    Operator,
    /// The `::` scope-resolution operator of C++-flavored decompiler output.
    ScopeOperator,
    Punctuation,
    Keyword,
    KeywordType,
    NameFunction,
    Name,
    NameVariable,
    NameRegister,
    NameLabel,
    NameCondition,
    /// Residual single symbol no other rule claims (`@`, `$`, ...).
    Other,
}

/// One entry of a rule table.
#[derive(Debug)]
pub struct Rule {
    pattern: Regex,
    pub category: Category,
    /// When set, only capture group 1 is consumed; the rest of the match is
    /// trailing context.
    lookahead: bool,
}

impl Rule {
    fn new(pattern: &str, category: Category) -> Self {
        let pattern = Regex::new(&format!("^(?:{pattern})")).expect("valid lexer rule");
        Self { pattern, category, lookahead: false }
    }

    fn with_lookahead(pattern: &str, category: Category) -> Self {
        Self { lookahead: true, ..Self::new(pattern, category) }
    }

    /// Length in bytes of the lexeme this rule would consume at the start of `rest`.
    pub fn match_len(&self, rest: &str) -> Option<usize> {
        if self.lookahead {
            self.pattern.captures(rest)?.get(1).map(|m| m.end())
        } else {
            self.pattern.find(rest).map(|m| m.end())
        }
    }
}

const PLACEHOLDERS: &str =
    r"<(?:FUNCTION|Number|STRING|VARIBLE|LABEL|CONDITION|ADDR|LOCADDR|INTERADDR|NUM)>";

const COMPOUND_OPERATORS: &str =
    r"->|\+\+|--|==|!=|>=|<=|&&|\|\||\+=|-=|\*=|/=|%=|&=|\^=|\|=|<<=|>>=|<<|>>|\.\.\.|##";

const KEYWORDS: &str = r"(?:asm|auto|break|case|const|continue|default|do|else|enum|extern|for|goto|if|inline|register|restrict|return|sizeof|static|struct|switch|typedef|union|volatile|while|true|false|NULL|nullptr|__fastcall|__cdecl|__stdcall|__thiscall|__usercall|__userpurge|__noreturn|__spoils|__hidden|__return_ptr|__struct_ptr|__array_ptr|__unused|__far|__near|__ptr32|__ptr64|__declspec|__attribute__|__pure|__noinline)\b";

const TYPES: &str = r"(?:bool|_Bool|char|double|float|int|long|short|signed|unsigned|void|wchar_t|size_t|ssize_t|__int8|__int16|__int32|__int64|__int128|__m64|__m128|__m128i|__m128d|__m256|__m256i)\b";

fn placeholder_rules() -> Vec<Rule> {
    vec![
        Rule::new(PLACEHOLDERS, Category::Placeholder),
        Rule::new("::", Category::ScopeOperator),
        Rule::new(COMPOUND_OPERATORS, Category::Operator),
    ]
}

fn keyword_rules() -> Vec<Rule> {
    vec![Rule::new(KEYWORDS, Category::Keyword), Rule::new(TYPES, Category::KeywordType)]
}

fn common_rules() -> Vec<Rule> {
    vec![
        Rule::new(r"\s+|\\\n", Category::Whitespace),
        Rule::new(r"//[^\n]*", Category::Comment),
        Rule::new(r"(?s)/\*.*?\*/", Category::Comment),
        Rule::new(r"(?s)/\*.*", Category::Comment),
        Rule::new(
            r"#[ \t]*(?:include|define|undef|ifdef|ifndef|if|elif|else|endif|pragma|error|warning|line)\b[^\n]*",
            Category::Comment,
        ),
        Rule::new(r#"(?:L|u8|u|U)?"(?:\\.|[^\\"\n])*""#, Category::String),
        Rule::new(r#"(?:L|u8|u|U)?"[^\n]*"#, Category::String),
        Rule::new(r"(?:L|u8|u|U)?'(?:\\[^\n]|[^\\'\n])*'", Category::String),
        Rule::new(r"(?:\d+\.\d*|\.\d+|\d+)[eE][+-]?\d+[fFlL]?", Category::Number),
        Rule::new(r"(?:\d+\.\d*|\.\d+|\d+[fF])[fF]?", Category::Number),
        Rule::new(r"0[xX][0-9a-fA-F]+[LlUu]*(?:u?i(?:8|16|32|64))?", Category::Number),
        Rule::new(r"0[bB][01]+[LlUu]*", Category::Number),
        Rule::new(r"0[0-7]+[LlUu]*(?:u?i(?:8|16|32|64))?", Category::Number),
        Rule::new(r"\d+[LlUu]*(?:u?i(?:8|16|32|64))?", Category::Number),
        Rule::new(r"[~!%^&*+=|?:<>/-]", Category::Operator),
        Rule::new(r"[()\[\],.;{}]", Category::Punctuation),
        Rule::new(r"[^\W\d]\w*", Category::Name),
        Rule::new(r"[^\s\w]", Category::Other),
    ]
}

fn decompiler_rules() -> Vec<Rule> {
    let mut rules = placeholder_rules();
    rules.extend([
        Rule::new(r"_?(?:Q|D|O|LO|HI)?WORD\d*\b", Category::KeywordType),
        Rule::new(r"_?(?:LO|HI|T)?BYTE\d*\b", Category::KeywordType),
        Rule::new(r"_?(?:LONG)?LONG\b", Category::KeywordType),
        Rule::new(r"_BOOL[1248]\b|_UNKNOWN\b", Category::KeywordType),
        Rule::new(r"sub_[A-F0-9]+\b", Category::NameFunction),
    ]);
    rules.extend(keyword_rules());
    // Call sites keep their open parenthesis in the lexeme.
    rules.push(Rule::new(r"[^\W\d]\w*\(", Category::NameFunction));
    rules.extend(common_rules());
    rules
}

fn analysis_tool_rules() -> Vec<Rule> {
    let mut rules = placeholder_rules();
    rules.extend([
        Rule::new(r"sub_[A-F0-9]+\b", Category::NameFunction),
        Rule::new(r"cond:\w+", Category::NameCondition),
        Rule::new(r"label_\w+", Category::NameLabel),
        Rule::new(r"var_\w+", Category::NameVariable),
        Rule::new(r"data_\w+", Category::NameVariable),
        Rule::new(r"[re][a-z0-9]{1,2}_\d+\b", Category::NameRegister),
        Rule::new(r"u?int\d*_t\b", Category::KeywordType),
    ]);
    rules.extend(keyword_rules());
    // A name followed by `(` is a function; the parenthesis stays a separate lexeme.
    rules.push(Rule::with_lookahead(r"([^\W\d]\w*)\s*\(", Category::NameFunction));
    rules.extend(common_rules());
    rules
}

static DECOMPILER_RULES: Lazy<Vec<Rule>> = Lazy::new(decompiler_rules);
static ANALYSIS_TOOL_RULES: Lazy<Vec<Rule>> = Lazy::new(analysis_tool_rules);

/// Rule table for a dialect.
pub fn table(dialect: Dialect) -> &'static [Rule] {
    match dialect {
        Dialect::Decompiler => &DECOMPILER_RULES,
        Dialect::AnalysisTool => &ANALYSIS_TOOL_RULES,
    }
}

static ANONYMOUS_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sub_[0-9A-Fa-f]+$").expect("valid anonymous-function regex"));

/// True for decompiler-generated names such as `sub_401000`.
pub fn is_anonymous_function(name: &str) -> bool {
    ANONYMOUS_FUNCTION.is_match(name)
}

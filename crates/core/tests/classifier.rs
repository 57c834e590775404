use namecorpus_core::classifier::{
    normalize_string_literal, Classifier, GENERIC_ADDR, INTER_ADDR, LOCAL_ADDR, NUMBER,
};
use namecorpus_core::model::{AddrRange, AddressContext, RawToken, SymbolTable, TokenKind};

fn symbols() -> SymbolTable {
    let mut table = SymbolTable::new();
    table.insert(0x1500, "str len".to_string());
    table.insert(0x1010, "local label".to_string());
    table
}

fn address(kind: TokenKind, value: i128) -> RawToken {
    RawToken::new(kind, format!("{value:#x}")).with_value(value)
}

#[test]
fn known_symbol_wins_over_address_ranges() {
    let table = symbols();
    let ctx = AddressContext::new(
        AddrRange::new(0x1000, 0x10ff),
        AddrRange::new(0x1000, 0x2000),
        &table,
    );
    let classifier = Classifier::default();

    assert_eq!(
        classifier.classify(&address(TokenKind::CodeRelativeAddress, 0x1500), &ctx),
        "str len"
    );
    // Inside the function, but a symbol is known for it.
    assert_eq!(
        classifier.classify(&address(TokenKind::PossibleAddress, 0x1010), &ctx),
        "local label"
    );
}

#[test]
fn addresses_fall_back_to_range_placeholders() {
    let table = SymbolTable::new();
    let ctx = AddressContext::new(
        AddrRange::new(0x1000, 0x10ff),
        AddrRange::new(0x1000, 0x2000),
        &table,
    );
    let classifier = Classifier::default();

    let cases = [
        (0x1000, LOCAL_ADDR),
        (0x10ff, LOCAL_ADDR),
        (0x1100, INTER_ADDR),
        (0x2000, INTER_ADDR),
        (0x2001, GENERIC_ADDR),
        (0x10, GENERIC_ADDR),
        (-8, GENERIC_ADDR),
    ];
    for (value, expected) in cases {
        for kind in [TokenKind::CodeRelativeAddress, TokenKind::PossibleAddress] {
            assert_eq!(
                classifier.classify(&address(kind, value), &ctx),
                expected,
                "{kind:?} {value:#x}"
            );
        }
    }
}

#[test]
fn integers_are_abstracted_above_threshold() {
    let table = SymbolTable::new();
    let ctx = AddressContext::new(AddrRange::new(0, 0), AddrRange::new(0, 0), &table);
    let int = |text: &str, value: i128| RawToken::new(TokenKind::Integer, text).with_value(value);

    let default = Classifier::default();
    assert_eq!(default.numeric_threshold(), 0);
    assert_eq!(default.classify(&int("0", 0), &ctx), "0");
    assert_eq!(default.classify(&int("-0x1", -1), &ctx), "-0x1");
    assert_eq!(default.classify(&int("0x8", 8), &ctx), NUMBER);

    let relaxed = Classifier::new(8);
    assert_eq!(relaxed.classify(&int("0x8", 8), &ctx), "0x8");
    assert_eq!(relaxed.classify(&int("0x9", 9), &ctx), NUMBER);
}

#[test]
fn strings_are_only_rewritten_when_enabled() {
    let table = SymbolTable::new();
    let ctx = AddressContext::new(AddrRange::new(0, 0), AddrRange::new(0, 0), &table);
    let token = RawToken::new(TokenKind::String, "\"file_not_found\"");

    assert_eq!(Classifier::default().classify(&token, &ctx), "\"file_not_found\"");
    assert_eq!(
        Classifier::default().with_string_rewrite(true).classify(&token, &ctx),
        "\" file not found \""
    );
}

#[test]
fn other_tokens_pass_through_unchanged() {
    let table = SymbolTable::new();
    let ctx = AddressContext::new(AddrRange::new(0, 0), AddrRange::new(0, 0), &table);
    let classifier = Classifier::default();

    for (kind, text) in [
        (TokenKind::Other, "mov"),
        (TokenKind::NameRegister, "rax"),
        (TokenKind::Whitespace, "    "),
        (TokenKind::Operator, "=="),
    ] {
        assert_eq!(classifier.classify(&RawToken::new(kind, text), &ctx), text);
    }
    // Address kinds without a value have nothing to classify.
    let bare = RawToken::new(TokenKind::PossibleAddress, "[rbp]");
    assert_eq!(classifier.classify(&bare, &ctx), "[rbp]");
}

#[test]
fn normalize_string_literal_spaces_quotes() {
    assert_eq!(normalize_string_literal("\"a_b\""), "\" a b \"");
    assert_eq!(normalize_string_literal("plain"), "plain");
}

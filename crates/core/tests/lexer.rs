use namecorpus_core::lexer::{
    is_anonymous_function, lex, mask_function_name, Category, Dialect, TokenizeError, Tokenizer,
    TokenizerOptions, FUNCTION_PLACEHOLDER,
};
use namecorpus_core::segmenter::Segmenter;

fn tokenize(source: &str, options: TokenizerOptions) -> Vec<String> {
    let segmenter = Segmenter::passthrough();
    Tokenizer::new(&segmenter, options).tokenize(source).expect("tokenize")
}

fn decompiler() -> TokenizerOptions {
    TokenizerOptions::new(Dialect::Decompiler)
}

fn analysis_tool() -> TokenizerOptions {
    TokenizerOptions::new(Dialect::AnalysisTool)
}

#[test]
fn compound_operators_are_single_lexemes() {
    let lexemes = lex("a->b", Dialect::Decompiler).expect("lex");
    let texts: Vec<&str> = lexemes.iter().map(|l| l.text).collect();
    assert_eq!(texts, vec!["a", "->", "b"]);
    assert_eq!(lexemes[1].category, Category::Operator);

    assert_eq!(tokenize("a->b", decompiler()), vec!["a", "->", "b"]);
    for op in ["++", "--", "==", "!=", ">=", "<=", "&&", "||", "<<=", ">>", "..."] {
        let source = format!("x {op} y");
        let tokens = tokenize(&source, analysis_tool());
        assert_eq!(tokens, vec!["x", op, "y"], "operator {op}");
    }
}

#[test]
fn scope_operator_and_comments_are_dropped() {
    let tokens = tokenize("std::swap(x, y); // swap them\n/* done */", decompiler());
    assert_eq!(tokens, vec!["std", "swap (", "x", ",", "y", ")", ";"]);
}

#[test]
fn decompiler_masks_definition_and_suppressed_calls() {
    let options = TokenizerOptions { keep_calls: false, ..decompiler() };
    let tokens = tokenize("int sub_401000(char *s){ return strlen(s); }", options);
    assert_eq!(
        tokens,
        vec![
            "int", "<FUNCTION>", "(", "char", "*", "s", ")", "{", "return", "<FUNCTION> (", "s",
            ")", ";", "}"
        ]
    );
}

#[test]
fn decompiler_segments_call_sites_and_keeps_synthetic_names() {
    let tokens = tokenize("v3 = GetFileSize(a1, 0);", decompiler());
    assert_eq!(tokens, vec!["v3", "=", "get file size (", "a1", ",", "0", ")", ";"]);

    let tokens = tokenize("result = bufferLength + 16;", decompiler());
    assert_eq!(tokens, vec!["result", "=", "buffer length", "+", "<Number>", ";"]);
}

#[test]
fn decompiler_types_and_labels() {
    let tokens = tokenize("_DWORD *v1; LABEL_12: goto LABEL_12;", decompiler());
    assert_eq!(tokens, vec!["_DWORD", "*", "v1", ";", "label", ":", "goto", "label", ";"]);
}

#[test]
fn decompiler_labels_share_one_token() {
    assert_eq!(tokenize("goto LABEL_12;", decompiler()), vec!["goto", "label", ";"]);

    let tokens = tokenize("goto LABEL_12; LABEL_12: return; goto LABEL_99;", decompiler());
    assert_eq!(
        tokens,
        vec!["goto", "label", ";", "label", ":", "return", ";", "goto", "label", ";"]
    );
}

#[test]
fn tokenize_errors_describe_the_failure() {
    let err = TokenizeError::Unrecognized {
        dialect: Dialect::Decompiler,
        category: Category::NameLabel,
        text: "LABEL_1".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains("NameLabel"), "{message}");
    assert!(message.contains("LABEL_1"), "{message}");

    let err = TokenizeError::Unlexable { offset: 7, text: "@".to_string() };
    assert!(err.to_string().contains("offset 7"));
    assert_ne!(err, TokenizeError::Unlexable { offset: 8, text: "@".to_string() });
}

#[test]
fn rule_tables_lex_any_input() {
    // The residual symbol class makes both dialects total over arbitrary text.
    let source = "@ $ ` \\ \u{00e9}t\u{00e9} \u{2603} #x";
    for dialect in [Dialect::Decompiler, Dialect::AnalysisTool] {
        let segmenter = Segmenter::passthrough();
        let result = Tokenizer::new(&segmenter, TokenizerOptions::new(dialect)).tokenize(source);
        assert!(result.is_ok(), "{dialect}: {result:?}");
    }
}

#[test]
fn strings_are_reassembled_or_suppressed() {
    let tokens = tokenize("puts(\"file_not_found\");", decompiler());
    assert_eq!(tokens, vec!["puts (", "\" file not found \"", ")", ";"]);

    let options = TokenizerOptions { keep_strings: false, ..decompiler() };
    let tokens = tokenize("puts(\"file_not_found\");", options);
    assert_eq!(tokens, vec!["puts (", "<STRING>", ")", ";"]);

    // A literal at the very end of the input is flushed too.
    assert_eq!(tokenize("x = \"end\"", decompiler()), vec!["x", "=", "\" end \""]);
}

#[test]
fn numbers_other_than_zero_are_abstracted() {
    let tokens = tokenize("x = 0; y = 0x10; z = 3.5f; w = 1u;", decompiler());
    assert_eq!(
        tokens,
        vec![
            "x", "=", "0", ";", "y", "=", "<Number>", ";", "z", "=", "<Number>", ";", "w", "=",
            "<Number>", ";"
        ]
    );
}

#[test]
fn analysis_tool_definition_pass_masks_recursion() {
    let tokens = tokenize("int32_t fact(int32_t arg1) { return fact(arg1 - 1); }", analysis_tool());
    assert_eq!(
        tokens,
        vec![
            "int32_t", FUNCTION_PLACEHOLDER, "(", "int32_t", "arg", ")", "{", "return",
            FUNCTION_PLACEHOLDER, "(", "arg", "-", "<Number>", ")", ";", "}"
        ]
    );
}

#[test]
fn analysis_tool_calls_and_bare_self_references() {
    let tokens = tokenize("void run() { callback = run; printValue(sub_4010); }", analysis_tool());
    assert_eq!(
        tokens,
        vec![
            "void", "<FUNCTION>", "(", ")", "{", "callback", "=", "<FUNCTION>", ";", "print value",
            "(", "<FUNCTION>", ")", ";", "}"
        ]
    );

    let options = TokenizerOptions { keep_calls: false, ..analysis_tool() };
    let tokens = tokenize("void run() { printValue(1); }", options);
    assert_eq!(
        tokens,
        vec!["void", "<FUNCTION>", "(", ")", "{", "<FUNCTION>", "(", "<Number>", ")", ";", "}"]
    );
}

#[test]
fn analysis_tool_identifier_categories() {
    let tokens = tokenize(
        "var_18 = rax_2; if (cond:0) goto label_40; data_1000 = edi_1;",
        analysis_tool(),
    );
    assert_eq!(
        tokens,
        vec![
            "<VARIBLE>", "=", "rax", ";", "if", "(", "<CONDITION>", ")", "goto", "<LABEL>", ";",
            "<VARIBLE>", "=", "edi", ";"
        ]
    );
}

#[test]
fn tokenizing_placeholders_is_a_fixed_point() {
    let segmenter = Segmenter::passthrough();
    for options in [decompiler(), analysis_tool()] {
        let tokenizer = Tokenizer::new(&segmenter, options);
        let source = "<FUNCTION> ( <STRING> , <Number> ) -> <VARIBLE> == <LABEL>";
        let once = tokenizer.tokenize(source).expect("tokenize");
        let twice = tokenizer.tokenize(&once.join(" ")).expect("tokenize again");
        assert_eq!(once, twice);
        assert_eq!(once.join(" "), source);
    }
}

#[test]
fn anonymous_function_pattern() {
    assert!(is_anonymous_function("sub_401000"));
    assert!(is_anonymous_function("sub_0"));
    assert!(!is_anonymous_function("sub_main"));
    assert!(!is_anonymous_function("my_sub_401000"));
}

#[test]
fn mask_function_name_replaces_whole_identifiers_only() {
    let source = "int ReadFile(int a1) { ReadFileEx(a1); return ReadFile(a1 - 1); }";
    assert_eq!(
        mask_function_name(source, "ReadFile"),
        "int sub_0(int a1) { ReadFileEx(a1); return sub_0(a1 - 1); }"
    );
    assert_eq!(mask_function_name("fofo", "fo"), "fofo");
    assert_eq!(mask_function_name(source, ""), source);
}

#[test]
fn dialect_parses_from_cli_names() {
    assert_eq!("decompiler".parse::<Dialect>(), Ok(Dialect::Decompiler));
    assert_eq!("analysis-tool".parse::<Dialect>(), Ok(Dialect::AnalysisTool));
    assert!("ida".parse::<Dialect>().is_err());
    assert_eq!(Dialect::AnalysisTool.to_string(), "analysis-tool");
}

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use log::debug;
use namecorpus_core::lexer::{mask_function_name, Dialect, Tokenizer};

use crate::commands::resolve_pipeline;

/// Arguments for `tokenize`; flags override the resolved pipeline settings.
#[derive(Debug, Clone)]
pub struct TokenizeArgs {
    pub root: String,
    pub config: Option<String>,
    /// Source file, or `-` for stdin.
    pub file: String,
    pub dialect: Option<Dialect>,
    pub keep_strings: bool,
    pub keep_calls: bool,
    /// Function name to mask as the anonymous name before lexing.
    pub mask: Option<String>,
}

fn read_source(file: &str) -> Result<String> {
    if file == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source).context("Failed to read source from stdin")?;
        return Ok(source);
    }
    fs::read_to_string(file).with_context(|| format!("Failed to read source file {file}"))
}

/// Tokenize one pseudo-source function and print the tokens space-joined.
pub fn tokenize_command(args: TokenizeArgs) -> Result<()> {
    let (root_path, pipeline) = resolve_pipeline(&args.root, args.config.as_deref())?;
    let segmenter = pipeline
        .load_segmenter(&root_path)
        .context("Failed to load subword model or word list")?;

    let mut options = pipeline.tokenizer_options();
    if let Some(dialect) = args.dialect {
        options.dialect = dialect;
    }
    options.keep_strings &= args.keep_strings;
    options.keep_calls &= args.keep_calls;
    debug!("Tokenizing {} with {:?}", args.file, options);

    let mut source = read_source(&args.file)?;
    if let Some(name) = args.mask.as_deref() {
        source = mask_function_name(&source, name);
    }

    let tokens = Tokenizer::new(&segmenter, options)
        .tokenize(&source)
        .with_context(|| format!("Failed to tokenize {}", args.file))?;
    println!("{}", tokens.join(" "));
    Ok(())
}

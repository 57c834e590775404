use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use log::LevelFilter;

use namecorpus::commands::{
    build_corpus_command, extract_command, init_project_command, list_runs_command,
    project_info_command, segment_command, tokenize_command, TokenizeArgs,
};
use namecorpus_core::lexer::Dialect;

/// Function-name corpus builder.
///
/// This CLI is a thin wrapper around `namecorpus-core`. All substantive logic
/// lives in the library so it can be tested thoroughly and reused.
#[derive(Parser, Debug)]
#[command(
    name = "namecorpus",
    version,
    about = "Build (code, function name) corpora from binary-analysis output",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease log verbosity (-q warnings only, -qq errors only).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new corpus project at the given root.
    ///
    /// Creates `.namecorpus/` with `project.json` and the project database, plus
    /// the `corpus`, `models`, and `records` directories.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show configuration, directories, and recorded runs of a project.
    ProjectInfo {
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Segment identifiers into sub-tokens.
    Segment {
        #[arg(long, default_value = ".")]
        root: String,

        /// Standalone pipeline config (JSON or YAML) used instead of the project's.
        #[arg(long)]
        config: Option<String>,

        /// Emit one JSON array per name instead of space-joined text.
        #[arg(long, default_value_t = false)]
        json: bool,

        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Tokenize a pseudo-source file and print the token sequence.
    Tokenize {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        config: Option<String>,

        /// Source file to tokenize (`-` reads stdin).
        file: String,

        /// Lexical dialect (`decompiler` or `analysis-tool`).
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Replace every string literal with `<STRING>`.
        #[arg(long, default_value_t = false)]
        no_strings: bool,

        /// Replace every resolved call target with `<FUNCTION>`.
        #[arg(long, default_value_t = false)]
        no_calls: bool,

        /// Function's own name to mask before tokenizing.
        #[arg(long)]
        mask: Option<String>,
    },

    /// Extract per-function records for one or more binaries.
    ///
    /// Each binary needs a `<binary>.name_and_addr` name map and a host dump
    /// next to it; records are written to `<binary>.json`.
    Extract {
        #[arg(long, default_value = ".")]
        root: String,

        /// Re-extract even when `<binary>.json` already exists.
        #[arg(long, default_value_t = false)]
        force: bool,

        #[arg(required = true)]
        binaries: Vec<String>,
    },

    /// Assemble src/tgt corpus files from extracted records.
    BuildCorpus {
        #[arg(long, default_value = ".")]
        root: String,

        /// Directory searched recursively for records. Defaults to `records/`.
        #[arg(long)]
        records: Option<String>,

        /// Split name used in file names (`train`, `valid`, `test`, ...).
        #[arg(long)]
        split: String,

        /// Output directory. Defaults to `corpus/<split>`.
        #[arg(long)]
        out: Option<String>,

        /// Drop duplicate (source, target) pairs.
        #[arg(long, default_value_t = false)]
        dedup: bool,
    },

    /// List extraction runs recorded in the project database.
    ListRuns {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,

        /// Only show runs for this binary.
        #[arg(long)]
        binary: Option<String>,
    },
}

fn init_logging(verbose: u8, quiet: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    let level = match (quiet, verbose) {
        (0, 0) => None,
        (0, 1) => Some(LevelFilter::Debug),
        (0, _) => Some(LevelFilter::Trace),
        (1, _) => Some(LevelFilter::Warn),
        _ => Some(LevelFilter::Error),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::InitProject { root, name } => init_project_command(&root, name)?,
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::Segment { root, config, json, names } => {
            segment_command(&root, config.as_deref(), &names, json)?
        }
        Command::Tokenize { root, config, file, dialect, no_strings, no_calls, mask } => {
            tokenize_command(TokenizeArgs {
                root,
                config,
                file,
                dialect,
                keep_strings: !no_strings,
                keep_calls: !no_calls,
                mask,
            })?
        }
        Command::Extract { root, force, binaries } => extract_command(&root, &binaries, force)?,
        Command::BuildCorpus { root, records, split, out, dedup } => {
            build_corpus_command(&root, records.as_deref(), &split, out.as_deref(), dedup)?
        }
        Command::ListRuns { root, json, binary } => {
            list_runs_command(&root, json, binary.as_deref())?
        }
    }

    Ok(())
}

//! namecorpus-core
//!
//! Core library for turning binary-analysis output into paired
//! (code representation, function name) corpora.
//!
//! This crate defines the token model, the identifier segmenter, the
//! address/number classifier, the representation normalizer, the
//! pseudo-source lexer, corpus assembly, host-dump adapters, and the small
//! project database used for bookkeeping.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends.

pub mod model;
pub mod segmenter;
pub mod classifier;
pub mod normalizer;
pub mod lexer;
pub mod names;
pub mod corpus;
pub mod config;
pub mod services;
pub mod db;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

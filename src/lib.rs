//! uprof studio
//!
//! Decoding and analysis of binary .uprof traces written by an
//! instrumenting script profiler.
//!
//! This crate provides the core implementation for the `uprof` CLI tool:
//! a token decoder, a call tree builder that folds direct self-recursion,
//! a bottom-up cost annotator, and three views (call graph, expensive
//! functions, flat statistics).
//!
//! ## Getting Started
//!
//! ```bash
//! uprof analyze --input level1.uprof --summary
//! ```
//!
//! Or from code:
//!
//! ```ignore
//! use uprof_studio::aggregator::analyze_file;
//! use uprof_studio::utils::config::AnalysisOptions;
//!
//! let analysis = analyze_file("level1.uprof", &AnalysisOptions::default(), &mut |_: u8| {})?;
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod utils;

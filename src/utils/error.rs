//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that stop decoding of a trace
///
/// None of these are fatal to the caller: decoding halts and whatever has
/// been built so far is still annotated and turned into views.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseError {
    #[error("Malformed header: truncated {field} at byte {offset}")]
    MalformedHeader { field: HeaderField, offset: u64 },

    #[error("Header declares function {id:#010x} twice")]
    DuplicateFunction { id: u32 },

    #[error("Header declares the reserved self id {id:#010x}")]
    ReservedFunctionId { id: u32 },

    #[error("Unexpected end of stream at byte {offset}")]
    UnexpectedEndOfStream { offset: u64 },

    #[error("Stack underflow: frame ended with {depth} open calls at byte {offset}")]
    StackUnderflow { depth: usize, offset: u64 },

    #[error("Cycle count without a matching call at byte {offset}")]
    UnmatchedCycleCount { offset: u64 },

    #[error("Unrecognized token {value:#010x} at byte {offset}")]
    UnrecognizedToken { value: u32, offset: u64 },

    #[error("Inconsistent cycles in {function}: {inclusive} inclusive < {children} in children")]
    InconsistentCycles {
        function: String,
        inclusive: i64,
        children: i64,
    },
}

/// Header field that was being read when the stream ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    UsecsPerCycle,
    FunctionCount,
    FunctionPointer,
    NameLength,
    FunctionName,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UsecsPerCycle => "usecs per cycle",
            Self::FunctionCount => "function count",
            Self::FunctionPointer => "function pointer",
            Self::NameLength => "name length",
            Self::FunctionName => "function name",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("Failed to generate flamegraph: {0}")]
    GenerationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors from parsing command-line option values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

//! Main parser for .uprof token streams.
//!
//! Reads the header, then feeds tokens to the tree builder until the end
//! marker or the first error. Errors never discard what was built: the
//! caller always gets a best-effort `ParsedTrace` plus its status.

use super::builder::{Flow, TreeBuilder};
use super::call_tree::CallTree;
use super::header::{read_header, ByteCursor};
use super::progress::Progress;
use super::registry::FunctionRegistry;
use super::token::Token;
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Used when the header is too short to carry the scale factor
pub const DEFAULT_USECS_PER_CYCLE: f64 = 1.0;

/// Terminal status of a parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum ParseStatus {
    /// End marker reached
    Complete,
    /// Stopped early; results hold everything up to the error
    Partial(ParseError),
}

impl ParseStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn error(&self) -> Option<&ParseError> {
        match self {
            Self::Complete => None,
            Self::Partial(e) => Some(e),
        }
    }

    /// Record `error` unless an earlier one is already recorded
    pub fn fail(&mut self, error: ParseError) {
        if self.is_complete() {
            *self = Self::Partial(error);
        } else {
            warn!("Additional error after partial parse: {}", error);
        }
    }
}

/// Decoded trace, before annotation
#[derive(Debug, Clone)]
pub struct ParsedTrace {
    pub usecs_per_cycle: f64,
    pub registry: FunctionRegistry,
    pub tree: CallTree,
    pub frame_count: u32,
    /// Sum of inclusive cycles returned to the root
    pub total_cycles: i64,
    /// Call stack depth when decoding stopped
    pub open_calls: usize,
    pub tokens_read: u64,
    pub bytes_read: u64,
    pub status: ParseStatus,
}

/// Parse a trace from `reader`
///
/// **Public** - main entry point for decoding
///
/// # Arguments
/// * `reader` - Byte source positioned at the start of the trace
/// * `total_len` - Stream length if known, used for progress only
/// * `progress` - Receives 0-80 while the stream is read
pub fn parse_trace<R: Read>(
    reader: R,
    total_len: Option<u64>,
    progress: &mut Progress<'_>,
) -> ParsedTrace {
    let mut cursor = ByteCursor::new(reader);
    let mut registry = FunctionRegistry::new();
    let mut status = ParseStatus::Complete;

    let usecs_per_cycle = match read_header(&mut cursor, &mut registry, progress, total_len) {
        Ok(header) => Some(header.usecs_per_cycle),
        Err(e) => {
            warn!("{}", e);
            status.fail(e);
            None
        }
    };

    let mut tokens_read = 0;
    let built = {
        let mut builder = TreeBuilder::new(&mut registry);
        if usecs_per_cycle.is_some() {
            loop {
                let offset = cursor.offset();
                let Ok(raw) = cursor.read_u32() else {
                    let e = ParseError::UnexpectedEndOfStream { offset };
                    warn!("{}", e);
                    status.fail(e);
                    break;
                };
                tokens_read += 1;
                progress.stream_position(cursor.offset(), total_len);

                match builder.apply(Token(raw).kind(), offset) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Finished) => break,
                    Err(e) => {
                        warn!("{}", e);
                        status.fail(e);
                        break;
                    }
                }
            }
        }
        builder.finish()
    };

    debug!(
        "Decoded {} tokens: {} frames, {} cycles, {} call sites",
        tokens_read,
        built.frame_count,
        built.total_cycles,
        built.tree.len() - 1
    );

    ParsedTrace {
        usecs_per_cycle: usecs_per_cycle.unwrap_or(DEFAULT_USECS_PER_CYCLE),
        registry,
        tree: built.tree,
        frame_count: built.frame_count,
        total_cycles: built.total_cycles,
        open_calls: built.open_calls,
        tokens_read,
        bytes_read: cursor.offset(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::encoder::TraceWriter;
    use crate::parser::progress::no_progress;
    use crate::parser::registry::FunctionId;
    use crate::utils::error::HeaderField;

    fn parse(bytes: &[u8]) -> ParsedTrace {
        let mut sink = no_progress;
        let mut progress = Progress::new(&mut sink);
        parse_trace(bytes, Some(bytes.len() as u64), &mut progress)
    }

    #[test]
    fn test_parse_complete_trace() {
        let bytes = TraceWriter::new(2.0)
            .function(4, "Main")
            .function(8, "Update")
            .enter(4)
            .enter(8)
            .cycles(101)
            .cycles(501)
            .frame_end()
            .finish();

        let parsed = parse(&bytes);
        assert!(parsed.status.is_complete());
        assert_eq!(parsed.usecs_per_cycle, 2.0);
        assert_eq!(parsed.total_cycles, 501);
        assert_eq!(parsed.frame_count, 1);
        assert_eq!(parsed.tokens_read, 6);
        assert_eq!(parsed.bytes_read, bytes.len() as u64);
        assert_eq!(parsed.registry.get(FunctionId(8)).unwrap().calls, 1);
    }

    #[test]
    fn test_missing_end_marker() {
        let bytes = TraceWriter::new(1.0)
            .function(4, "Main")
            .enter(4)
            .cycles(9)
            .into_bytes();

        let parsed = parse(&bytes);
        assert_eq!(
            parsed.status,
            ParseStatus::Partial(ParseError::UnexpectedEndOfStream {
                offset: bytes.len() as u64
            })
        );
        assert_eq!(parsed.total_cycles, 9);
    }

    #[test]
    fn test_truncated_header_keeps_declared_functions() {
        let mut bytes = TraceWriter::new(3.0)
            .function(4, "Main")
            .function(8, "Update")
            .finish();
        // Cut inside the second function's pointer
        bytes.truncate(8 + 4 + 4 + 4 + 4 + 2);

        let parsed = parse(&bytes);
        assert_eq!(
            parsed.status,
            ParseStatus::Partial(ParseError::MalformedHeader {
                field: HeaderField::FunctionPointer,
                offset: 24,
            })
        );
        assert_eq!(parsed.registry.name_of(FunctionId(4)), "Main");
        assert!(parsed.tree.is_empty());
        assert_eq!(parsed.tokens_read, 0);
        assert_eq!(parsed.usecs_per_cycle, DEFAULT_USECS_PER_CYCLE);
    }

    #[test]
    fn test_end_marker_with_open_calls_is_complete() {
        let bytes = TraceWriter::new(1.0).function(4, "Main").enter(4).finish();

        let parsed = parse(&bytes);
        assert!(parsed.status.is_complete());
        assert_eq!(parsed.open_calls, 1);
    }

    #[test]
    fn test_first_error_wins() {
        let mut status = ParseStatus::Complete;
        status.fail(ParseError::UnmatchedCycleCount { offset: 4 });
        status.fail(ParseError::UnexpectedEndOfStream { offset: 8 });
        assert_eq!(status.error(), Some(&ParseError::UnmatchedCycleCount { offset: 4 }));
    }
}

//! Trace decoding.
//!
//! This module handles:
//! - Reading the .uprof header into the function registry
//! - Classifying raw 32 bit tokens
//! - Building the call tree from the token stream
//! - Writing traces back in the same wire layout
//! - Defining the JSON report schema

pub mod builder;
pub mod call_tree;
pub mod encoder;
pub mod header;
pub mod progress;
pub mod registry;
pub mod schema;
pub mod token;
pub mod trace;

// Re-export main types
pub use call_tree::{CallNode, CallTree, NodeId, NodeKind};
pub use encoder::TraceWriter;
pub use progress::{no_progress, Progress, ProgressSink};
pub use registry::{FunctionId, FunctionRecord, FunctionRegistry};
pub use schema::{to_report, HotPath, Report, ReportNode, ReportStatus};
pub use token::{Token, TokenKind};
pub use trace::{parse_trace, ParseStatus, ParsedTrace};

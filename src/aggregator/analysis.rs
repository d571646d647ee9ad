//! Full analysis pipeline: decode, annotate, derive views.
//!
//! Decoding finishes before anything else runs, since every label depends
//! on the final total cycle count.

use super::annotator::annotate;
use super::flat_stats::FlatView;
use super::views::expensive_functions;
use crate::parser::call_tree::CallTree;
use crate::parser::progress::{Progress, ProgressSink};
use crate::parser::registry::FunctionRegistry;
use crate::parser::trace::{parse_trace, ParseStatus, ParsedTrace};
use crate::utils::config::{AnalysisOptions, ANNOTATED_PROGRESS, COMPLETE_PROGRESS, DECODED_PROGRESS};
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Everything derived from one trace
///
/// Immutable snapshot; analysing another trace produces a new one.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub usecs_per_cycle: f64,
    pub frame_count: u32,
    pub total_cycles: i64,
    /// Call stack depth when decoding stopped
    pub open_calls: usize,
    pub tokens_read: u64,
    pub bytes_read: u64,
    pub status: ParseStatus,
    pub registry: FunctionRegistry,

    /// Annotated tree, percentage labels
    pub call_graph: CallTree,

    /// Copy of the call graph, usec per top-level call labels
    pub expensive_functions: CallTree,

    pub flat: FlatView,
}

/// Analyse a trace read from `reader`
///
/// **Public** - main entry point of the library
///
/// # Arguments
/// * `reader` - Byte source positioned at the start of the trace
/// * `total_len` - Stream length if known, used for progress only
/// * `options` - Sort behaviour of the views
/// * `sink` - Receives monotonically increasing progress, ending at 100
pub fn analyze_trace<R: Read>(
    reader: R,
    total_len: Option<u64>,
    options: &AnalysisOptions,
    sink: &mut dyn ProgressSink,
) -> Analysis {
    let mut progress = Progress::new(sink);
    let parsed = parse_trace(reader, total_len, &mut progress);
    analyze_parsed(parsed, options, &mut progress)
}

/// Open and analyse a trace file
///
/// # Errors
/// Only failures to open the file; decoding problems land in `status`.
pub fn analyze_file(
    path: impl AsRef<Path>,
    options: &AnalysisOptions,
    sink: &mut dyn ProgressSink,
) -> io::Result<Analysis> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let total_len = file.metadata().ok().map(|m| m.len());
    info!("Analysing {} ({} bytes)", path.display(), total_len.unwrap_or(0));

    Ok(analyze_trace(BufReader::new(file), total_len, options, sink))
}

/// Annotate a decoded trace and derive the views
pub fn analyze_parsed(
    parsed: ParsedTrace,
    options: &AnalysisOptions,
    progress: &mut Progress<'_>,
) -> Analysis {
    let ParsedTrace {
        usecs_per_cycle,
        mut registry,
        mut tree,
        frame_count,
        total_cycles,
        open_calls,
        tokens_read,
        bytes_read,
        mut status,
    } = parsed;
    progress.advance(DECODED_PROGRESS);

    for issue in annotate(&mut tree, &mut registry, total_cycles, options) {
        status.fail(issue);
    }
    progress.advance(ANNOTATED_PROGRESS);

    let expensive = expensive_functions(&tree, &registry, usecs_per_cycle, options);
    let flat = FlatView::build(&registry, total_cycles, frame_count, usecs_per_cycle, options);
    progress.advance(COMPLETE_PROGRESS);

    debug!(
        "Analysis done: {} frames, {} cycles, {} rows, status {:?}",
        frame_count,
        total_cycles,
        flat.rows().len(),
        status
    );

    Analysis {
        usecs_per_cycle,
        frame_count,
        total_cycles,
        open_calls,
        tokens_read,
        bytes_read,
        status,
        registry,
        call_graph: tree,
        expensive_functions: expensive,
        flat,
    }
}

//! Cost annotation and view synthesis.
//!
//! This module turns a decoded call tree into:
//! - An annotated call graph (inclusive/exclusive cycles, self nodes)
//! - The expensive functions view (usec per top-level call)
//! - Flat per-function statistics
//! - Collapsed stacks and hot paths for flamegraphs

pub mod analysis;
pub mod annotator;
pub mod flat_stats;
pub mod format;
pub mod metrics;
pub mod stack_builder;
pub mod views;

// Re-export main types and functions
pub use analysis::{analyze_file, analyze_parsed, analyze_trace, Analysis};
pub use annotator::annotate;
pub use flat_stats::{Column, FlatRow, FlatView, SortOrder};
pub use metrics::calculate_hot_paths;
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
pub use views::expensive_functions;

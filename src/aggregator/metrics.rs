//! Hot paths from collapsed stacks.
//!
//! Hot paths are the call paths with the largest exclusive cycle counts.

use super::format::percent_of;
use super::stack_builder::CollapsedStack;
use crate::parser::schema::HotPath;
use log::debug;

/// Number of hot paths kept in a report
pub const DEFAULT_HOT_PATHS: usize = 10;

/// Calculate hot paths from collapsed stacks
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Collapsed stacks, heaviest first
/// * `total_cycles` - Cycles spent in top-level calls
/// * `top_n` - Number of top paths to return
pub fn calculate_hot_paths(stacks: &[CollapsedStack], total_cycles: i64, top_n: usize) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    stacks
        .iter()
        .take(top_n)
        .map(|stack| HotPath {
            stack: stack.stack.clone(),
            cycles: stack.weight,
            percentage: percent_of(stack.weight as i64, total_cycles),
        })
        .collect()
}

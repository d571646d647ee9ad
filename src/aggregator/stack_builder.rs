//! Build collapsed stack format from the annotated call graph.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "Main;Update;Physics 1000"
//! This means: Main called Update which called Physics, and 1000 cycles were
//! spent in Physics itself.

use super::format::node_name;
use crate::parser::call_tree::{CallTree, NodeId};
use crate::parser::registry::FunctionRegistry;
use log::debug;

/// A single collapsed stack entry
///
/// **Public** - used by flamegraph generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Exclusive cycles of the innermost frame
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Render as one folded line ("a;b;c 42")
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }

    /// Innermost frame name
    pub fn leaf(&self) -> &str {
        self.stack.rsplit(';').next().unwrap_or(&self.stack)
    }
}

/// Build collapsed stacks from an annotated call graph
///
/// **Public** - main entry point for stack building
///
/// # Arguments
/// * `tree` - Call graph after annotation (self nodes present)
/// * `registry` - Function names
///
/// # Returns
/// One stack per call path with positive exclusive cycles, heaviest first
///
/// # Algorithm
/// 1. A self node gives its cycles to the path of its parent call
/// 2. A call node without children is its own exclusive time
/// 3. Zero and negative weights are skipped
pub fn build_collapsed_stacks(tree: &CallTree, registry: &FunctionRegistry) -> Vec<CollapsedStack> {
    let mut stacks = Vec::new();

    for id in tree.preorder() {
        let node = tree.node(id);
        let frame = if node.is_self_time() {
            match tree.parent(id) {
                Some(parent) if parent != tree.root() => parent,
                _ => continue,
            }
        } else if node.kind.function().is_some() && tree.children(id).is_empty() {
            id
        } else {
            continue;
        };

        if node.cycles <= 0 {
            continue;
        }
        stacks.push(CollapsedStack::new(stack_string(tree, registry, frame), node.cycles as u64));
    }

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} collapsed stacks", stacks.len());
    stacks
}

/// Sum of all stack weights
pub fn total_weight(stacks: &[CollapsedStack]) -> u64 {
    stacks.iter().map(|s| s.weight).sum()
}

fn stack_string(tree: &CallTree, registry: &FunctionRegistry, id: NodeId) -> String {
    tree.path_to(id)
        .into_iter()
        .map(|frame| sanitize_frame(&node_name(registry, tree.node(frame).kind)))
        .collect::<Vec<_>>()
        .join(";")
}

/// Folded format reserves ';' as separator and newlines as record ends
fn sanitize_frame(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ';' => ':',
            '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}

//! Output JSON schema definitions for analysed traces.
//!
//! This module defines the structure of JSON reports we write to disk.
//! Schema is versioned to allow future evolution.

use super::call_tree::{CallTree, NodeId, NodeKind};
use super::registry::FunctionRegistry;
use super::trace::ParseStatus;
use crate::aggregator::analysis::Analysis;
use crate::aggregator::flat_stats::{Column, FlatRow, SortOrder};
use crate::aggregator::format::node_name;
use crate::utils::config::REPORT_SCHEMA_VERSION;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Trace file that was analysed
    pub source: String,

    /// Timestamp when report was generated (RFC 3339)
    pub generated_at: String,

    pub status: ReportStatus,

    pub usecs_per_cycle: f64,
    pub frame_count: u32,
    pub total_cycles: i64,

    /// Annotated call graph, top-level functions at the first level
    pub call_graph: Vec<ReportNode>,

    /// Same shape as `call_graph`, labelled with usec per top-level call
    pub expensive_functions: Vec<ReportNode>,

    /// Flat statistics in display order
    pub flat: Vec<FlatRow>,
    pub flat_sort: Column,
    pub flat_order: SortOrder,

    /// Heaviest call paths by exclusive cycles
    #[serde(default)]
    pub hot_paths: Vec<HotPath>,
}

/// How far decoding got
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatus {
    pub parse: ParseStatus,

    /// Call stack depth when decoding stopped
    pub open_calls: usize,
    pub tokens_read: u64,
    pub bytes_read: u64,
}

/// One tree node, children nested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportNode {
    pub label: String,
    pub name: String,
    pub kind: NodeKind,
    pub cycles: i64,
    pub calls: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportNode>,
}

/// A hot path in the execution (stack trace with cycles)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPath {
    /// Collapsed stack representation (e.g., "Main;Update;Physics")
    pub stack: String,

    /// Exclusive cycles of the innermost frame
    pub cycles: u64,

    /// Percentage of total cycles
    pub percentage: f64,
}

/// Convert an analysis into the serializable report
///
/// **Public** - used by the analyze command before writing JSON
pub fn to_report(analysis: &Analysis, source: &str, hot_paths: Vec<HotPath>) -> Report {
    Report {
        version: REPORT_SCHEMA_VERSION.to_string(),
        source: source.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        status: ReportStatus {
            parse: analysis.status.clone(),
            open_calls: analysis.open_calls,
            tokens_read: analysis.tokens_read,
            bytes_read: analysis.bytes_read,
        },
        usecs_per_cycle: analysis.usecs_per_cycle,
        frame_count: analysis.frame_count,
        total_cycles: analysis.total_cycles,
        call_graph: ReportNode::forest(&analysis.call_graph, &analysis.registry),
        expensive_functions: ReportNode::forest(&analysis.expensive_functions, &analysis.registry),
        flat: analysis.flat.rows().to_vec(),
        flat_sort: analysis.flat.sort_column(),
        flat_order: analysis.flat.sort_order(),
        hot_paths,
    }
}

impl ReportNode {
    /// Convert the children of the root of `tree` into nested report nodes
    ///
    /// One walk over the whole tree; the synthetic root is dropped.
    pub fn forest(tree: &CallTree, registry: &FunctionRegistry) -> Vec<ReportNode> {
        Self::from_tree(tree, registry, tree.root()).children
    }

    /// Nested copy of the subtree at `id`
    ///
    /// Built bottom-up from a pre-order walk so deep traces do not recurse.
    pub fn from_tree(tree: &CallTree, registry: &FunctionRegistry, id: NodeId) -> ReportNode {
        let order = tree.preorder_from(id);
        let mut built: Vec<Option<ReportNode>> = vec![None; tree.len()];

        for &current in order.iter().rev() {
            let node = tree.node(current);
            let children = tree
                .children(current)
                .iter()
                .filter_map(|child| built[child.0].take())
                .collect();
            built[current.0] = Some(ReportNode {
                label: node.label.clone(),
                name: node_name(registry, node.kind),
                kind: node.kind,
                cycles: node.cycles,
                calls: node.calls,
                children,
            });
        }

        built[id.0].take().unwrap_or_else(|| ReportNode {
            label: String::new(),
            name: String::new(),
            kind: NodeKind::Root,
            cycles: 0,
            calls: 0,
            children: Vec::new(),
        })
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::registry::FunctionId;

    #[test]
    fn test_forest_keeps_child_order() {
        let mut registry = FunctionRegistry::new();
        registry.declare(FunctionId(4), "Main").unwrap();
        registry.declare(FunctionId(8), "Update").unwrap();

        let mut tree = CallTree::new();
        let root = tree.root();
        let main = tree.add_child(root, NodeKind::Call(FunctionId(4)));
        tree.add_child(main, NodeKind::SelfTime(FunctionId(4)));
        tree.add_child(main, NodeKind::Call(FunctionId(8)));

        let forest = ReportNode::forest(&tree, &registry);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "Main");
        let names: Vec<&str> = forest[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["self", "Update"]);
        assert_eq!(forest[0].node_count(), 3);
    }

    #[test]
    fn test_forest_with_many_top_level_calls() {
        let mut registry = FunctionRegistry::new();
        let mut tree = CallTree::new();
        let root = tree.root();
        for i in 1..=2000u32 {
            registry.declare(FunctionId(i * 4), format!("F{}", i)).unwrap();
            let call = tree.add_child(root, NodeKind::Call(FunctionId(i * 4)));
            tree.add_child(call, NodeKind::SelfTime(FunctionId(i * 4)));
        }

        let forest = ReportNode::forest(&tree, &registry);

        assert_eq!(forest.len(), 2000);
        assert_eq!(forest[0].name, "F1");
        assert_eq!(forest[1999].name, "F2000");
        assert!(forest.iter().all(|node| node.node_count() == 2));
    }
}

//! Arena-backed call tree.
//!
//! A node is a call site, not a function: the same function shows up once
//! per distinct path from the root. Parents are indices into the arena so
//! unwinding on return stays O(1) without ownership cycles.

use super::registry::FunctionId;
use crate::utils::config::ROOT_LABEL;
use serde::{Deserialize, Serialize};

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// What a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "function", rename_all = "snake_case")]
pub enum NodeKind {
    /// Outside any frame
    Root,
    /// Call site of a function
    Call(FunctionId),
    /// Exclusive time of the parent call site, which belongs to the function
    SelfTime(FunctionId),
}

impl NodeKind {
    /// Id used for registry lookups; self time resolves to the sentinel
    pub fn lookup_id(self) -> Option<FunctionId> {
        match self {
            Self::Root => None,
            Self::Call(id) => Some(id),
            Self::SelfTime(_) => Some(FunctionId::SELF),
        }
    }

    pub fn function(self) -> Option<FunctionId> {
        match self {
            Self::Root => None,
            Self::Call(id) | Self::SelfTime(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallNode {
    pub kind: NodeKind,

    /// Inclusive cycles attributed to this exact call site. Signed so an
    /// inconsistent stream surfaces as negative self time.
    pub cycles: i64,

    /// Times this call site was entered
    pub calls: u32,

    /// Display label, filled in by the annotator
    pub label: String,

    pub children: Vec<NodeId>,

    /// Non-owning back reference, `None` only for the root
    pub parent: Option<NodeId>,
}

impl CallNode {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            cycles: 0,
            calls: 0,
            label: String::new(),
            children: Vec::new(),
            parent,
        }
    }

    pub fn is_self_time(&self) -> bool {
        matches!(self.kind, NodeKind::SelfTime(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTree {
    nodes: Vec<CallNode>,
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CallTree {
    /// Tree holding only the synthetic root
    pub fn new() -> Self {
        let mut root = CallNode::new(NodeKind::Root, None);
        root.label = ROOT_LABEL.to_string();
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &CallNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut CallNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Number of nodes, the root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Append a new child to `parent`
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(CallNode::new(kind, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Existing call site of `function` directly below `parent`
    pub fn find_call(&self, parent: NodeId, function: FunctionId) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.node(child).kind == NodeKind::Call(function))
    }

    /// Top-level call sites, in child order
    pub fn top_level(&self) -> &[NodeId] {
        self.children(self.root())
    }

    /// Depth-first pre-order ids, starting at the root
    ///
    /// Iterating it in reverse visits every child before its parent.
    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_from(self.root())
    }

    pub fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            order.push(id);
            pending.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Root-to-node path of call sites, root excluded
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root() {
                break;
            }
            path.push(node);
            current = self.parent(node);
        }
        path.reverse();
        path
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.path_to(id).len()
    }
}

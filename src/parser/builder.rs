//! Call tree state machine.
//!
//! Consumes classified tokens one at a time. The explicit call stack only
//! exists to spot direct self recursion (A entered while A is current).
//! Mutual recursion and longer cycles are not folded and get one node per
//! level, which is a known limitation of the trace format's consumers.

use super::call_tree::{CallTree, NodeId, NodeKind};
use super::registry::{FunctionId, FunctionRegistry};
use super::token::TokenKind;
use crate::utils::error::ParseError;
use log::{debug, warn};

/// Whether the builder wants more tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished,
}

pub struct TreeBuilder<'r> {
    registry: &'r mut FunctionRegistry,
    tree: CallTree,
    current: NodeId,
    call_stack: Vec<FunctionId>,
    frame_count: u32,
    total_cycles: i64,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(registry: &'r mut FunctionRegistry) -> Self {
        let tree = CallTree::new();
        let current = tree.root();
        Self {
            registry,
            tree,
            current,
            call_stack: Vec::new(),
            frame_count: 0,
            total_cycles: 0,
        }
    }

    /// Apply one token
    ///
    /// # Errors
    /// On error the tree keeps everything built before this token and the
    /// caller must stop feeding tokens.
    pub fn apply(&mut self, token: TokenKind, offset: u64) -> Result<Flow, ParseError> {
        match token {
            TokenKind::FunctionEnter(id) => {
                self.enter(id);
                Ok(Flow::Continue)
            }
            TokenKind::CycleCount(delta) => {
                self.leave(delta, offset)?;
                Ok(Flow::Continue)
            }
            TokenKind::FrameEnd => {
                if !self.call_stack.is_empty() {
                    return Err(ParseError::StackUnderflow {
                        depth: self.call_stack.len(),
                        offset,
                    });
                }
                self.frame_count += 1;
                Ok(Flow::Continue)
            }
            TokenKind::EndMarker => {
                if self.call_stack.is_empty() {
                    debug!("End of stream after {} frames", self.frame_count);
                } else {
                    warn!(
                        "End of stream with stack depth {} at byte {}",
                        self.call_stack.len(),
                        offset
                    );
                }
                Ok(Flow::Finished)
            }
            TokenKind::Unrecognized(value) => Err(ParseError::UnrecognizedToken { value, offset }),
        }
    }

    fn enter(&mut self, id: FunctionId) {
        self.registry.record_call(id);

        if self.tree.node(self.current).kind != NodeKind::Call(id) {
            let parent = self.current;
            self.current = match self.tree.find_call(parent, id) {
                Some(existing) => existing,
                None => self.tree.add_child(parent, NodeKind::Call(id)),
            };
        }
        self.tree.node_mut(self.current).calls += 1;
        self.call_stack.push(id);
    }

    fn leave(&mut self, delta: u32, offset: u64) -> Result<(), ParseError> {
        let Some(function) = self.call_stack.pop() else {
            return Err(ParseError::UnmatchedCycleCount { offset });
        };

        // Closing a self recursive re-entry; the outermost return carries
        // the cycles.
        if self.call_stack.last() == Some(&function) {
            return Ok(());
        }

        let Some(parent) = self.tree.parent(self.current) else {
            return Err(ParseError::UnmatchedCycleCount { offset });
        };
        self.tree.node_mut(self.current).cycles += i64::from(delta);
        self.current = parent;

        if parent == self.tree.root() {
            self.total_cycles += i64::from(delta);
        }
        Ok(())
    }

    /// Hand over the tree built so far
    pub fn finish(self) -> BuiltTree {
        BuiltTree {
            tree: self.tree,
            frame_count: self.frame_count,
            total_cycles: self.total_cycles,
            open_calls: self.call_stack.len(),
        }
    }
}

/// Result of the decoding pass
#[derive(Debug, Clone)]
pub struct BuiltTree {
    pub tree: CallTree,
    pub frame_count: u32,
    /// Sum of cycles returned to the root
    pub total_cycles: i64,
    /// Call stack depth when decoding stopped
    pub open_calls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::Token;

    const MAIN: u32 = 4;
    const UPDATE: u32 = 8;

    fn feed(registry: &mut FunctionRegistry, tokens: &[u32]) -> (BuiltTree, Option<ParseError>) {
        let mut builder = TreeBuilder::new(registry);
        let mut error = None;
        for (index, &raw) in tokens.iter().enumerate() {
            match builder.apply(Token(raw).kind(), index as u64 * 4) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Finished) => break,
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }
        }
        (builder.finish(), error)
    }

    fn registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry.declare(FunctionId(MAIN), "Main").unwrap();
        registry.declare(FunctionId(UPDATE), "Update").unwrap();
        registry
    }

    #[test]
    fn test_nested_call_attribution() {
        let mut registry = registry();
        let (built, error) = feed(&mut registry, &[MAIN, UPDATE, 101, 501, 3, 0]);

        assert!(error.is_none());
        let tree = &built.tree;
        let main = tree.find_call(tree.root(), FunctionId(MAIN)).unwrap();
        let update = tree.find_call(main, FunctionId(UPDATE)).unwrap();
        assert_eq!(tree.node(main).cycles, 501);
        assert_eq!(tree.node(update).cycles, 101);
        assert_eq!(built.total_cycles, 501);
        assert_eq!(built.frame_count, 1);
        assert_eq!(built.open_calls, 0);
    }

    #[test]
    fn test_repeated_calls_share_a_node() {
        let mut registry = registry();
        let (built, _) = feed(&mut registry, &[MAIN, 9, MAIN, 13, 3, 0]);

        let tree = &built.tree;
        assert_eq!(tree.top_level().len(), 1);
        let main = tree.top_level()[0];
        assert_eq!(tree.node(main).calls, 2);
        assert_eq!(tree.node(main).cycles, 22);
        assert_eq!(registry.get(FunctionId(MAIN)).unwrap().calls, 2);
    }

    #[test]
    fn test_direct_recursion_folds_into_one_node() {
        let mut registry = registry();
        // Main -> Main -> Update, inner Main return is discarded
        let (built, error) = feed(&mut registry, &[MAIN, MAIN, UPDATE, 41, 77, 201, 3, 0]);

        assert!(error.is_none());
        let tree = &built.tree;
        let main = tree.find_call(tree.root(), FunctionId(MAIN)).unwrap();
        assert_eq!(tree.children(main).len(), 1);
        assert_eq!(tree.find_call(main, FunctionId(MAIN)), None);
        assert_eq!(tree.node(main).calls, 2);
        assert_eq!(tree.node(main).cycles, 201);
        assert_eq!(built.total_cycles, 201);
        assert_eq!(registry.get(FunctionId(MAIN)).unwrap().calls, 2);
    }

    #[test]
    fn test_mutual_recursion_is_not_folded() {
        let mut registry = registry();
        let (built, error) = feed(&mut registry, &[MAIN, UPDATE, MAIN, 5, 9, 17, 3, 0]);

        assert!(error.is_none());
        let tree = &built.tree;
        let main = tree.find_call(tree.root(), FunctionId(MAIN)).unwrap();
        let update = tree.find_call(main, FunctionId(UPDATE)).unwrap();
        let inner = tree.find_call(update, FunctionId(MAIN)).unwrap();
        assert_eq!(tree.node(inner).cycles, 5);
        assert_eq!(tree.node(update).cycles, 9);
        assert_eq!(tree.node(main).cycles, 17);
    }

    #[test]
    fn test_frame_end_with_open_calls_underflows() {
        let mut registry = registry();
        let (built, error) = feed(&mut registry, &[MAIN, 9, 3, MAIN, UPDATE, 3, 0]);

        assert_eq!(error, Some(ParseError::StackUnderflow { depth: 2, offset: 20 }));
        assert_eq!(built.frame_count, 1);
        assert_eq!(built.open_calls, 2);
        // Main and Update, nothing after the bad frame end
        assert_eq!(built.tree.len(), 3);
    }

    #[test]
    fn test_cycle_count_without_call() {
        let mut registry = registry();
        let (built, error) = feed(&mut registry, &[5, 0]);
        assert_eq!(error, Some(ParseError::UnmatchedCycleCount { offset: 0 }));
        assert!(built.tree.is_empty());
    }

    #[test]
    fn test_unrecognized_token_stops() {
        let mut registry = registry();
        let (built, error) = feed(&mut registry, &[MAIN, 6, 9]);
        assert_eq!(error, Some(ParseError::UnrecognizedToken { value: 6, offset: 4 }));
        assert_eq!(built.open_calls, 1);
    }
}

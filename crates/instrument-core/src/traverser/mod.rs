/*!
# Traverser - Tree Rewriting Engine

Depth-first walker that drives instrumentation passes over a list of
top-level statements.

## Overview

A `Pass` gets four extension points:

1. `before_traverse`: sees (and may replace) the whole top-level list
2. `enter_node`: pre-order; keep, replace, or keep and skip the children
3. `leave_node`: post-order; keep, replace, or remove the node
4. `after_traverse`: sees the final top-level list; the only hook that can
   splice statements in or out at the top level

Trees are owned and rewritten by move. Every hook receives its node by value
and hands back the node it wants in that position.

## Example Usage

```rust
use instrument_core::ast::build::*;
use instrument_core::traverser::Traverser;
use instrument_core::passes::BypassPass;
use instrument_core::InstrumentConfig;

let config = InstrumentConfig::default();
let mut traverser = Traverser::new().with_pass(BypassPass::new(&config));
let rewritten = traverser.traverse(vec![stmt(prop(var("a"), "b"))])?;
assert_eq!(rewritten.len(), 1);
# Ok::<(), instrument_core::traverser::TraverseError>(())
```
*/

mod walk;

use tracing::debug;

use crate::ast::Node;
use walk::Walker;

/// What a pass wants done with a node it has just entered
#[derive(Debug, Clone, PartialEq)]
pub enum EnterAction {
    Keep(Node),
    /// Put this node in place of the entered one. Its children are walked,
    /// but the pass that produced it does not enter it again.
    Replace(Node),
    /// Keep the node and do not walk its children
    SkipChildren(Node),
}

/// What a pass wants done with a node it is leaving
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveAction {
    Keep(Node),
    Replace(Node),
    /// Drop the node from its parent. Only valid in list and optional
    /// positions.
    Remove,
}

/// A rewriting pass driven by the `Traverser`
///
/// All hooks default to leaving the tree untouched, so a pass only
/// implements the ones it needs.
pub trait Pass {
    /// Human-readable name for this pass
    fn name(&self) -> &'static str;

    /// Called once with the top-level statements before the walk starts.
    /// Passes reset their per-traversal state here.
    fn before_traverse(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        nodes
    }

    fn enter_node(&mut self, node: Node) -> EnterAction {
        EnterAction::Keep(node)
    }

    fn leave_node(&mut self, node: Node) -> LeaveAction {
        LeaveAction::Keep(node)
    }

    /// Called once with the rewritten top-level statements after the walk
    fn after_traverse(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        nodes
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TraverseError {
    #[error("Cannot remove required child '{slot}' of {parent}")]
    RemovedRequiredChild {
        parent: &'static str,
        slot: &'static str,
    },
}

/// Counters gathered during one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalSummary {
    pub visited: usize,
    pub replaced: usize,
    pub removed: usize,
    /// Nodes whose children were not walked
    pub skipped: usize,
}

impl TraversalSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changed(&self) -> bool {
        self.replaced > 0 || self.removed > 0
    }
}

/// Runs an ordered list of passes over a tree in a single walk
///
/// Each hook is offered to every pass in registration order. A node replaced
/// by one pass is what the next pass sees.
#[derive(Default)]
pub struct Traverser {
    passes: Vec<Box<dyn Pass>>,
    last_summary: Option<TraversalSummary>,
}

impl Traverser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.add_pass(Box::new(pass));
        self
    }

    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        debug!(pass = pass.name(), "registered pass");
        self.passes.push(pass);
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Counters from the most recent successful traversal
    pub fn last_summary(&self) -> Option<TraversalSummary> {
        self.last_summary
    }

    pub fn traverse(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>, TraverseError> {
        let mut passes: Vec<&mut dyn Pass> = Vec::with_capacity(self.passes.len());
        for pass in self.passes.iter_mut() {
            passes.push(&mut **pass);
        }

        let (nodes, summary) = run(&mut passes, nodes)?;
        self.last_summary = Some(summary);
        Ok(nodes)
    }
}

/// Run a single pass over `nodes`
pub fn traverse(pass: &mut dyn Pass, nodes: Vec<Node>) -> Result<Vec<Node>, TraverseError> {
    let mut passes = [pass];
    let (nodes, _) = run(&mut passes, nodes)?;
    Ok(nodes)
}

fn run(
    passes: &mut [&mut dyn Pass],
    nodes: Vec<Node>,
) -> Result<(Vec<Node>, TraversalSummary), TraverseError> {
    let mut nodes = nodes;
    for pass in passes.iter_mut() {
        nodes = pass.before_traverse(nodes);
    }

    let mut walker = Walker::new(passes);
    let nodes = walker.walk_list(nodes)?;
    let summary = walker.finish();

    let mut nodes = nodes;
    for pass in passes.iter_mut() {
        nodes = pass.after_traverse(nodes);
    }

    debug!(
        passes = passes.len(),
        visited = summary.visited,
        replaced = summary.replaced,
        removed = summary.removed,
        skipped = summary.skipped,
        "traversal finished"
    );

    Ok((nodes, summary))
}

/*!
# Timing Pass

Brackets a fragment with timer calls:

```text
\Timer::markStart();
...statements...
\Timer::markEnd(<last expression>);
```

Every top-level control path ends in exactly one `markEnd`. Top-level
`return`s are rewritten in place to `return \Timer::markEnd(<value>);`.
Returns inside functions, methods and closures belong to those bodies and
are left alone; the pass tracks how deeply it is nested in function-like
nodes to tell them apart.
*/

use tracing::trace;

use crate::ast::{Attributes, Name, Node, NodeKind};
use crate::synth::{sentinel, QualifiedCall};
use crate::traverser::{EnterAction, LeaveAction, Pass};
use crate::InstrumentConfig;

pub const MARK_START: &str = "markStart";
pub const MARK_END: &str = "markEnd";

#[derive(Debug, Clone)]
pub struct TimingPass {
    timer: Name,
    no_return_value: Name,
    depth: usize,
}

impl TimingPass {
    pub fn new(config: &InstrumentConfig) -> Self {
        Self {
            timer: config.timer_name(),
            no_return_value: config.no_return_value_name(),
            depth: 0,
        }
    }

    /// Current function nesting depth; 0 outside a traversal
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn start_call(&self) -> Node {
        QualifiedCall::new(self.timer.clone(), MARK_START).into_node(Attributes::default())
    }

    /// `markEnd(value)`, or `markEnd(new NoReturnValue())` without a value
    fn end_call(&self, value: Option<Node>) -> Node {
        let attrs = value
            .as_ref()
            .map(|value| value.attrs.clone())
            .unwrap_or_default();
        let value = value.unwrap_or_else(|| sentinel(&self.no_return_value));
        QualifiedCall::new(self.timer.clone(), MARK_END)
            .arg(value)
            .into_node(attrs)
    }

    fn close(&self, last: Node) -> Vec<Node> {
        if last.is_expression() {
            return vec![self.end_call(Some(last))];
        }

        match last.kind {
            NodeKind::Expression(expr) => {
                let end = self.end_call(Some(*expr));
                vec![Node::new(NodeKind::Expression(Box::new(end)), last.attrs)]
            }
            NodeKind::Return(value) => vec![Node::new(NodeKind::Return(value), last.attrs)],
            kind => vec![
                Node::new(kind, last.attrs),
                Node::statement(self.end_call(None)),
            ],
        }
    }
}

impl Pass for TimingPass {
    fn name(&self) -> &'static str {
        "timing"
    }

    fn before_traverse(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        self.depth = 0;
        nodes
    }

    fn enter_node(&mut self, node: Node) -> EnterAction {
        if node.is_function_like() {
            self.depth += 1;
            return EnterAction::Keep(node);
        }

        match node.kind {
            NodeKind::Return(value) if self.depth == 0 => {
                trace!(span = ?node.attrs.span, "instrumenting top-level return");
                let end = self.end_call(value.map(|value| *value));
                EnterAction::Replace(Node::new(
                    NodeKind::Return(Some(Box::new(end))),
                    node.attrs,
                ))
            }
            kind => EnterAction::Keep(Node::new(kind, node.attrs)),
        }
    }

    fn leave_node(&mut self, node: Node) -> LeaveAction {
        if node.is_function_like() {
            assert!(
                self.depth > 0,
                "left a {} node that was never entered",
                node.kind_name()
            );
            self.depth -= 1;
        }
        LeaveAction::Keep(node)
    }

    fn after_traverse(&mut self, mut nodes: Vec<Node>) -> Vec<Node> {
        nodes.insert(0, Node::statement(self.start_call()));
        if let Some(last) = nodes.pop() {
            let closing = self.close(last);
            nodes.extend(closing);
        }
        nodes
    }
}

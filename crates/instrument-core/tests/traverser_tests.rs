/*!
# Traverser Integration Tests

Hook ordering, removal, skipping and multi-pass composition.
*/

use std::cell::RefCell;
use std::rc::Rc;

use instrument_core::ast::build::*;
use instrument_core::ast::{Name, NameRef, Node, NodeKind};
use instrument_core::{
    traverse, BypassPass, EnterAction, InstrumentConfig, LeaveAction, Pass, TimingPass, ToSource,
    TraversalSummary, TraverseError, Traverser,
};
use pretty_assertions::assert_eq;

type Log = Rc<RefCell<Vec<String>>>;

/// Logs every enter and leave under its own label
struct Tagged {
    label: &'static str,
    log: Log,
}

impl Pass for Tagged {
    fn name(&self) -> &'static str {
        self.label
    }

    fn enter_node(&mut self, node: Node) -> EnterAction {
        self.log
            .borrow_mut()
            .push(format!("{} enter {}", self.label, node.kind_name()));
        EnterAction::Keep(node)
    }

    fn leave_node(&mut self, node: Node) -> LeaveAction {
        self.log
            .borrow_mut()
            .push(format!("{} leave {}", self.label, node.kind_name()));
        LeaveAction::Keep(node)
    }
}

/// Removes every `$name` variable on the way out
struct RemoveVariable(&'static str);

impl Pass for RemoveVariable {
    fn name(&self) -> &'static str {
        "remove-variable"
    }

    fn leave_node(&mut self, node: Node) -> LeaveAction {
        match &node.kind {
            NodeKind::Variable(name) if name == self.0 => LeaveAction::Remove,
            _ => LeaveAction::Keep(node),
        }
    }
}

/// Skips the children of every closure
struct SkipClosures;

impl Pass for SkipClosures {
    fn name(&self) -> &'static str {
        "skip-closures"
    }

    fn enter_node(&mut self, node: Node) -> EnterAction {
        if matches!(node.kind, NodeKind::Closure { .. }) {
            EnterAction::SkipChildren(node)
        } else {
            EnterAction::Keep(node)
        }
    }
}

/// Renames variables on entry
struct Rename {
    from: &'static str,
    to: &'static str,
}

impl Pass for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn enter_node(&mut self, node: Node) -> EnterAction {
        match &node.kind {
            NodeKind::Variable(name) if name == self.from => EnterAction::Replace(var(self.to)),
            _ => EnterAction::Keep(node),
        }
    }
}

#[test]
fn test_passes_run_in_registration_order() -> anyhow::Result<()> {
    let log = Log::default();
    let mut traverser = Traverser::new()
        .with_pass(Tagged {
            label: "first",
            log: log.clone(),
        })
        .with_pass(Tagged {
            label: "second",
            log: log.clone(),
        });
    assert_eq!(traverser.pass_names(), vec!["first", "second"]);

    traverser.traverse(vec![stmt(var("a"))])?;
    assert_eq!(
        *log.borrow(),
        vec![
            "first enter Expression",
            "second enter Expression",
            "first enter Variable",
            "second enter Variable",
            "first leave Variable",
            "second leave Variable",
            "first leave Expression",
            "second leave Expression",
        ]
    );
    Ok(())
}

#[test]
fn test_children_walked_in_source_order() -> anyhow::Result<()> {
    let log = Log::default();
    let mut pass = Tagged {
        label: "p",
        log: log.clone(),
    };
    traverse(
        &mut pass,
        vec![stmt(method(var("o"), "m", vec![int(1), string("s")]))],
    )?;

    let entered: Vec<String> = log
        .borrow()
        .iter()
        .filter(|event| event.contains("enter"))
        .cloned()
        .collect();
    assert_eq!(
        entered,
        vec![
            "p enter Expression",
            "p enter MethodCall",
            "p enter Variable",
            "p enter Literal",
            "p enter Literal",
        ]
    );
    Ok(())
}

#[test]
fn test_remove_from_lists() -> anyhow::Result<()> {
    let nodes = vec![
        stmt(call("f", vec![var("a"), var("keep"), var("a")])),
        echo(vec![var("a"), var("keep")]),
        stmt(array(vec![var("a"), int(1)])),
    ];
    let result = traverse(&mut RemoveVariable("a"), nodes)?;
    assert_eq!(result.to_source(), "f($keep);\necho $keep;\n[1];");
    Ok(())
}

#[test]
fn test_remove_from_optional_slot() -> anyhow::Result<()> {
    let nodes = vec![ret(Some(var("a"))), function("g", vec![param_with_default("x", var("a"))], vec![])];
    let result = traverse(&mut RemoveVariable("a"), nodes)?;
    assert_eq!(result.to_source(), "return;\nfunction g($x)\n{\n}");
    Ok(())
}

#[test]
fn test_remove_top_level_statement() -> anyhow::Result<()> {
    struct DropEcho;
    impl Pass for DropEcho {
        fn name(&self) -> &'static str {
            "drop-echo"
        }
        fn leave_node(&mut self, node: Node) -> LeaveAction {
            match node.kind {
                NodeKind::Echo(_) => LeaveAction::Remove,
                _ => LeaveAction::Keep(node),
            }
        }
    }

    let nodes = vec![echo(vec![int(1)]), stmt(call("f", vec![])), echo(vec![int(2)])];
    let mut traverser = Traverser::new().with_pass(DropEcho);
    let result = traverser.traverse(nodes)?;

    assert_eq!(result.to_source(), "f();");
    assert_eq!(
        traverser.last_summary(),
        Some(TraversalSummary {
            visited: 6,
            replaced: 0,
            removed: 2,
            skipped: 0,
        })
    );
    Ok(())
}

#[test]
fn test_remove_from_required_slot_fails() {
    let nodes = vec![stmt(assign(var("b"), var("a")))];
    let err = traverse(&mut RemoveVariable("a"), nodes).unwrap_err();
    assert_eq!(
        err,
        TraverseError::RemovedRequiredChild {
            parent: "Assign",
            slot: "value",
        }
    );

    let nodes = vec![stmt(var("a"))];
    let err = traverse(&mut RemoveVariable("a"), nodes).unwrap_err();
    assert_eq!(
        err,
        TraverseError::RemovedRequiredChild {
            parent: "Expression",
            slot: "expr",
        }
    );
}

#[test]
fn test_remove_short_circuits_later_passes() -> anyhow::Result<()> {
    let log = Log::default();
    let mut traverser = Traverser::new()
        .with_pass(RemoveVariable("a"))
        .with_pass(Tagged {
            label: "after",
            log: log.clone(),
        });
    traverser.traverse(vec![echo(vec![var("a")])])?;

    assert_eq!(
        *log.borrow(),
        vec![
            "after enter Echo",
            "after enter Variable",
            "after leave Echo",
        ]
    );
    Ok(())
}

#[test]
fn test_skip_children() -> anyhow::Result<()> {
    let nodes = vec![stmt(call(
        "f",
        vec![closure(vec![], vec![ret(Some(var("old")))]), var("old")],
    ))];
    let mut traverser = Traverser::new()
        .with_pass(SkipClosures)
        .with_pass(Rename {
            from: "old",
            to: "new",
        });
    let result = traverser.traverse(nodes)?;

    assert_eq!(
        result.to_source(),
        "f(function () {\n    return $old;\n}, $new);"
    );
    assert_eq!(traverser.last_summary().map(|s| s.skipped), Some(1));
    Ok(())
}

#[test]
fn test_later_pass_sees_replacement() -> anyhow::Result<()> {
    let mut traverser = Traverser::new()
        .with_pass(Rename { from: "a", to: "b" })
        .with_pass(Rename { from: "b", to: "c" });
    let result = traverser.traverse(vec![stmt(var("a"))])?;
    assert_eq!(result.to_source(), "$c;");
    assert_eq!(traverser.last_summary().map(|s| s.replaced), Some(2));
    Ok(())
}

#[test]
fn test_replacement_not_reentered_by_same_pass() -> anyhow::Result<()> {
    struct Wrap;
    impl Pass for Wrap {
        fn name(&self) -> &'static str {
            "wrap"
        }
        fn enter_node(&mut self, node: Node) -> EnterAction {
            match node.kind {
                NodeKind::FuncCall { args, .. } => EnterAction::Replace(Node::bare(NodeKind::FuncCall {
                    callee: NameRef::Named(Name::parse("wrapped")),
                    args,
                })),
                kind => EnterAction::Keep(Node::new(kind, node.attrs)),
            }
        }
    }

    let result = traverse(&mut Wrap, vec![stmt(call("f", vec![call("g", vec![var("x")])]))])?;
    assert_eq!(result.to_source(), "wrapped(wrapped($x));");
    Ok(())
}

#[test]
fn test_list_hooks() -> anyhow::Result<()> {
    struct Frame;
    impl Pass for Frame {
        fn name(&self) -> &'static str {
            "frame"
        }
        fn before_traverse(&mut self, mut nodes: Vec<Node>) -> Vec<Node> {
            nodes.retain(|node| !matches!(node.kind, NodeKind::Echo(_)));
            nodes
        }
        fn after_traverse(&mut self, mut nodes: Vec<Node>) -> Vec<Node> {
            nodes.insert(0, stmt(call("begin", vec![])));
            nodes.push(stmt(call("end", vec![])));
            nodes
        }
    }

    let log = Log::default();
    let mut traverser = Traverser::new().with_pass(Frame).with_pass(Tagged {
        label: "t",
        log: log.clone(),
    });
    let result = traverser.traverse(vec![echo(vec![int(1)]), stmt(var("x"))])?;

    assert_eq!(result.to_source(), "begin();\n$x;\nend();");
    // Only statements present during the walk are visited
    assert!(!log.borrow().iter().any(|event| event.contains("Echo")));
    assert_eq!(log.borrow().len(), 4);
    Ok(())
}

fn timing_and_bypass(timing_first: bool) -> Traverser {
    let config = InstrumentConfig::default();
    if timing_first {
        Traverser::new()
            .with_pass(TimingPass::new(&config))
            .with_pass(BypassPass::new(&config))
    } else {
        Traverser::new()
            .with_pass(BypassPass::new(&config))
            .with_pass(TimingPass::new(&config))
    }
}

#[test]
fn test_timing_and_bypass_share_a_walk() -> anyhow::Result<()> {
    for timing_first in [true, false] {
        let mut traverser = timing_and_bypass(timing_first);

        let result = traverser.traverse(vec![ret(None)])?;
        assert_eq!(
            result.to_source(),
            "\\Instrument\\Timer::markStart();\nreturn \\Instrument\\Timer::markEnd(new \\Instrument\\NoReturnValue());"
        );

        let result = traverser.traverse(vec![ret(Some(int(1))), stmt(int(2))])?;
        assert_eq!(
            result.to_source(),
            "\\Instrument\\Timer::markStart();\nreturn \\Instrument\\Timer::markEnd(1);\n\\Instrument\\Timer::markEnd(2);"
        );

        let result = traverser.traverse(vec![
            ret(Some(prop(var("a"), "b"))),
            stmt(static_call("A", "c", vec![])),
        ])?;
        assert_eq!(
            result.to_source(),
            "\\Instrument\\Timer::markStart();\n\
             return \\Instrument\\Timer::markEnd(\\Instrument\\Bypass::fetchProperty($a, 'b'));\n\
             \\Instrument\\Timer::markEnd(\\Instrument\\Bypass::callStatic('A', 'c'));"
        );
    }
    Ok(())
}

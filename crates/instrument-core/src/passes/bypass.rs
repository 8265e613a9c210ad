/*!
# Access-Bypass Pass

Rewrites member access so it goes through the bypass runtime instead of the
normal visibility rules:

| Source                  | Rewritten                                   |
|-------------------------|---------------------------------------------|
| `$obj->name`            | `fetchProperty($obj, 'name')`               |
| `$obj->name = $v`       | `assignProperty($obj, 'name', $v)`          |
| `$obj->name(...)`       | `callMethod($obj, 'name', ...)`             |
| `Cls::$name`            | `fetchStaticProperty('Cls', 'name')`        |
| `Cls::$name = $v`       | `assignStaticProperty('Cls', 'name', $v)`   |
| `Cls::name(...)`        | `callStatic('Cls', 'name', ...)`            |
| `Cls::NAME`             | `fetchClassConst('Cls', 'NAME')`            |
| `new Cls(...)`          | `newInstance('Cls', ...)`                   |

Literal names become string literals; dynamic names are passed through.
Access to the runtime classes themselves (the timer, the bypass target and
the no-return-value sentinel) is left as written, so the pass can share a
traverser with the timing pass. Rewriting happens on entry, and the arguments of the new call are walked
afterwards, so nested access inside them is rewritten as well.
*/

use tracing::trace;

use crate::ast::{Arg, Name, NameRef, Node, NodeKind};
use crate::synth::{class_argument, member_argument, QualifiedCall};
use crate::traverser::{EnterAction, Pass};
use crate::InstrumentConfig;

/// Runtime operation a rewritten node turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BypassOp {
    FetchProperty,
    AssignProperty,
    CallMethod,
    FetchStaticProperty,
    AssignStaticProperty,
    CallStatic,
    FetchClassConst,
    NewInstance,
}

impl BypassOp {
    pub fn method_name(self) -> &'static str {
        match self {
            BypassOp::FetchProperty => "fetchProperty",
            BypassOp::AssignProperty => "assignProperty",
            BypassOp::CallMethod => "callMethod",
            BypassOp::FetchStaticProperty => "fetchStaticProperty",
            BypassOp::AssignStaticProperty => "assignStaticProperty",
            BypassOp::CallStatic => "callStatic",
            BypassOp::FetchClassConst => "fetchClassConst",
            BypassOp::NewInstance => "newInstance",
        }
    }

    /// The operation for a node kind, or `None` when the kind is not rewritten
    pub fn for_node(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::PropertyFetch { .. } => Some(BypassOp::FetchProperty),
            NodeKind::MethodCall { .. } => Some(BypassOp::CallMethod),
            NodeKind::StaticPropertyFetch { .. } => Some(BypassOp::FetchStaticProperty),
            NodeKind::StaticCall { .. } => Some(BypassOp::CallStatic),
            NodeKind::ClassConstFetch { .. } => Some(BypassOp::FetchClassConst),
            NodeKind::New { .. } => Some(BypassOp::NewInstance),
            NodeKind::Assign { target, .. } => match target.kind {
                NodeKind::PropertyFetch { .. } => Some(BypassOp::AssignProperty),
                NodeKind::StaticPropertyFetch { .. } => Some(BypassOp::AssignStaticProperty),
                _ => None,
            },

            NodeKind::Literal(_)
            | NodeKind::Variable(_)
            | NodeKind::ConstFetch(_)
            | NodeKind::Array(_)
            | NodeKind::BinaryOp { .. }
            | NodeKind::UnaryOp { .. }
            | NodeKind::FuncCall { .. }
            | NodeKind::Closure { .. }
            | NodeKind::ArrowFunction { .. }
            | NodeKind::Expression(_)
            | NodeKind::Return(_)
            | NodeKind::Echo(_)
            | NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::Block(_)
            | NodeKind::Function { .. }
            | NodeKind::Class { .. }
            | NodeKind::ClassMethod { .. }
            | NodeKind::PropertyDecl { .. }
            | NodeKind::ClassConst { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BypassPass {
    target: Name,
    runtime_classes: Vec<Name>,
    rewrite_construction: bool,
}

impl BypassPass {
    pub fn new(config: &InstrumentConfig) -> Self {
        Self {
            target: config.bypass_name(),
            runtime_classes: vec![
                config.timer_name(),
                config.bypass_name(),
                config.no_return_value_name(),
            ],
            rewrite_construction: config.rewrite_construction,
        }
    }

    fn handles(&self, op: BypassOp) -> bool {
        op != BypassOp::NewInstance || self.rewrite_construction
    }

    /// Whether `kind` is static access or construction on a runtime class
    fn targets_runtime(&self, kind: &NodeKind) -> bool {
        let class = match kind {
            NodeKind::StaticPropertyFetch { class, .. }
            | NodeKind::StaticCall { class, .. }
            | NodeKind::ClassConstFetch { class, .. }
            | NodeKind::New { class, .. } => class,
            NodeKind::Assign { target, .. } => return self.targets_runtime(&target.kind),
            _ => return false,
        };
        match class {
            NameRef::Named(name) => self
                .runtime_classes
                .iter()
                .any(|runtime| runtime.parts == name.parts),
            NameRef::Dynamic(_) => false,
        }
    }
}

impl Pass for BypassPass {
    fn name(&self) -> &'static str {
        "bypass"
    }

    fn enter_node(&mut self, node: Node) -> EnterAction {
        let op = match BypassOp::for_node(&node.kind) {
            Some(op) if self.handles(op) && !self.targets_runtime(&node.kind) => op,
            _ => return EnterAction::Keep(node),
        };

        let Node { kind, attrs } = node;
        match call_arguments(kind) {
            Ok(args) => {
                trace!(op = op.method_name(), span = ?attrs.span, "rewriting access");
                let call = QualifiedCall::new(self.target.clone(), op.method_name()).with_args(args);
                EnterAction::Replace(call.into_node(attrs))
            }
            Err(kind) => EnterAction::Keep(Node::new(kind, attrs)),
        }
    }
}

/// Arguments of the bypass call that replaces `kind`
///
/// Hands the kind back untouched when it is not a rewritable shape.
fn call_arguments(kind: NodeKind) -> Result<Vec<Arg>, NodeKind> {
    match kind {
        NodeKind::PropertyFetch { object, name } => {
            Ok(vec![Arg::new(*object), Arg::new(member_argument(name))])
        }
        NodeKind::MethodCall { object, name, args } => {
            let mut result = vec![Arg::new(*object), Arg::new(member_argument(name))];
            result.extend(args);
            Ok(result)
        }
        NodeKind::StaticPropertyFetch { class, name } => Ok(vec![
            Arg::new(class_argument(class)),
            Arg::new(member_argument(name)),
        ]),
        NodeKind::StaticCall { class, name, args } => {
            let mut result = vec![
                Arg::new(class_argument(class)),
                Arg::new(member_argument(name)),
            ];
            result.extend(args);
            Ok(result)
        }
        NodeKind::ClassConstFetch { class, name } => Ok(vec![
            Arg::new(class_argument(class)),
            Arg::new(member_argument(name)),
        ]),
        NodeKind::New { class, args } => {
            let mut result = vec![Arg::new(class_argument(class))];
            result.extend(args);
            Ok(result)
        }
        NodeKind::Assign { target, value } => {
            let Node {
                kind: target,
                attrs: target_attrs,
            } = *target;
            match target {
                NodeKind::PropertyFetch { object, name } => Ok(vec![
                    Arg::new(*object),
                    Arg::new(member_argument(name)),
                    Arg::new(*value),
                ]),
                NodeKind::StaticPropertyFetch { class, name } => Ok(vec![
                    Arg::new(class_argument(class)),
                    Arg::new(member_argument(name)),
                    Arg::new(*value),
                ]),
                target => Err(NodeKind::Assign {
                    target: Box::new(Node::new(target, target_attrs)),
                    value,
                }),
            }
        }
        kind => Err(kind),
    }
}

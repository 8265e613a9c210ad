// Depth-first walk over owned nodes
// Children are visited in source order; every slot is rebuilt from whatever
// the passes hand back

use crate::ast::{Arg, Attributes, Ident, NameRef, Node, NodeKind, Param};

use super::{EnterAction, LeaveAction, Pass, TraversalSummary, TraverseError};

type WalkResult<T> = Result<T, TraverseError>;

pub(super) struct Walker<'a, 'p> {
    passes: &'a mut [&'p mut dyn Pass],
    summary: TraversalSummary,
}

impl<'a, 'p> Walker<'a, 'p> {
    pub(super) fn new(passes: &'a mut [&'p mut dyn Pass]) -> Self {
        Self {
            passes,
            summary: TraversalSummary::new(),
        }
    }

    pub(super) fn finish(self) -> TraversalSummary {
        self.summary
    }

    /// Walk a list slot; removed nodes drop out of the list
    pub(super) fn walk_list(&mut self, nodes: Vec<Node>) -> WalkResult<Vec<Node>> {
        let mut result = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(node) = self.visit(node)? {
                result.push(node);
            }
        }
        Ok(result)
    }

    /// Enter, walk children, leave. `None` means a pass removed the node.
    fn visit(&mut self, node: Node) -> WalkResult<Option<Node>> {
        self.summary.visited += 1;

        let mut node = node;
        let mut skip_children = false;
        for pass in self.passes.iter_mut() {
            let attrs = node.attrs.clone();
            node = match pass.enter_node(node) {
                EnterAction::Keep(node) => node,
                EnterAction::Replace(replacement) => {
                    self.summary.replaced += 1;
                    adopt(replacement, attrs)
                }
                EnterAction::SkipChildren(node) => {
                    skip_children = true;
                    node
                }
            };
        }

        if skip_children {
            self.summary.skipped += 1;
        } else {
            node = self.walk_children(node)?;
        }

        for pass in self.passes.iter_mut() {
            let attrs = node.attrs.clone();
            node = match pass.leave_node(node) {
                LeaveAction::Keep(node) => node,
                LeaveAction::Replace(replacement) => {
                    self.summary.replaced += 1;
                    adopt(replacement, attrs)
                }
                LeaveAction::Remove => {
                    self.summary.removed += 1;
                    return Ok(None);
                }
            };
        }

        Ok(Some(node))
    }

    fn required(
        &mut self,
        parent: &'static str,
        slot: &'static str,
        child: Box<Node>,
    ) -> WalkResult<Box<Node>> {
        match self.visit(*child)? {
            Some(node) => Ok(Box::new(node)),
            None => Err(TraverseError::RemovedRequiredChild { parent, slot }),
        }
    }

    fn optional(&mut self, child: Option<Box<Node>>) -> WalkResult<Option<Box<Node>>> {
        match child {
            Some(child) => Ok(self.visit(*child)?.map(Box::new)),
            None => Ok(None),
        }
    }

    fn ident(&mut self, parent: &'static str, ident: Ident) -> WalkResult<Ident> {
        match ident {
            Ident::Literal(name) => Ok(Ident::Literal(name)),
            Ident::Dynamic(expr) => Ok(Ident::Dynamic(self.required(parent, "name", expr)?)),
        }
    }

    fn name_ref(
        &mut self,
        parent: &'static str,
        slot: &'static str,
        name: NameRef,
    ) -> WalkResult<NameRef> {
        match name {
            NameRef::Named(name) => Ok(NameRef::Named(name)),
            NameRef::Dynamic(expr) => Ok(NameRef::Dynamic(self.required(parent, slot, expr)?)),
        }
    }

    fn args(&mut self, args: Vec<Arg>) -> WalkResult<Vec<Arg>> {
        let mut result = Vec::with_capacity(args.len());
        for arg in args {
            let Arg {
                value,
                by_ref,
                unpack,
            } = arg;
            if let Some(value) = self.visit(value)? {
                result.push(Arg {
                    value,
                    by_ref,
                    unpack,
                });
            }
        }
        Ok(result)
    }

    fn params(&mut self, params: Vec<Param>) -> WalkResult<Vec<Param>> {
        let mut result = Vec::with_capacity(params.len());
        for param in params {
            let default = match param.default {
                Some(default) => self.visit(default)?,
                None => None,
            };
            result.push(Param { default, ..param });
        }
        Ok(result)
    }

    fn walk_children(&mut self, node: Node) -> WalkResult<Node> {
        let Node { kind, attrs } = node;
        let parent = kind.name();

        let kind = match kind {
            NodeKind::Literal(_) | NodeKind::Variable(_) | NodeKind::ConstFetch(_) => kind,

            NodeKind::Array(items) => NodeKind::Array(self.walk_list(items)?),
            NodeKind::BinaryOp { op, left, right } => {
                let left = self.required(parent, "left", left)?;
                let right = self.required(parent, "right", right)?;
                NodeKind::BinaryOp { op, left, right }
            }
            NodeKind::UnaryOp { op, operand } => NodeKind::UnaryOp {
                op,
                operand: self.required(parent, "operand", operand)?,
            },
            NodeKind::Assign { target, value } => {
                let target = self.required(parent, "target", target)?;
                let value = self.required(parent, "value", value)?;
                NodeKind::Assign { target, value }
            }
            NodeKind::FuncCall { callee, args } => {
                let callee = self.name_ref(parent, "callee", callee)?;
                let args = self.args(args)?;
                NodeKind::FuncCall { callee, args }
            }

            NodeKind::PropertyFetch { object, name } => {
                let object = self.required(parent, "object", object)?;
                let name = self.ident(parent, name)?;
                NodeKind::PropertyFetch { object, name }
            }
            NodeKind::MethodCall { object, name, args } => {
                let object = self.required(parent, "object", object)?;
                let name = self.ident(parent, name)?;
                let args = self.args(args)?;
                NodeKind::MethodCall { object, name, args }
            }
            NodeKind::StaticPropertyFetch { class, name } => {
                let class = self.name_ref(parent, "class", class)?;
                let name = self.ident(parent, name)?;
                NodeKind::StaticPropertyFetch { class, name }
            }
            NodeKind::StaticCall { class, name, args } => {
                let class = self.name_ref(parent, "class", class)?;
                let name = self.ident(parent, name)?;
                let args = self.args(args)?;
                NodeKind::StaticCall { class, name, args }
            }
            NodeKind::ClassConstFetch { class, name } => {
                let class = self.name_ref(parent, "class", class)?;
                let name = self.ident(parent, name)?;
                NodeKind::ClassConstFetch { class, name }
            }
            NodeKind::New { class, args } => {
                let class = self.name_ref(parent, "class", class)?;
                let args = self.args(args)?;
                NodeKind::New { class, args }
            }

            NodeKind::Closure {
                params,
                uses,
                is_static,
                body,
            } => {
                let params = self.params(params)?;
                let body = self.walk_list(body)?;
                NodeKind::Closure {
                    params,
                    uses,
                    is_static,
                    body,
                }
            }
            NodeKind::ArrowFunction { params, body } => {
                let params = self.params(params)?;
                let body = self.required(parent, "body", body)?;
                NodeKind::ArrowFunction { params, body }
            }

            NodeKind::Expression(expr) => {
                NodeKind::Expression(self.required(parent, "expr", expr)?)
            }
            NodeKind::Return(value) => NodeKind::Return(self.optional(value)?),
            NodeKind::Echo(values) => NodeKind::Echo(self.walk_list(values)?),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.required(parent, "condition", condition)?;
                let then_branch = self.walk_list(then_branch)?;
                let else_branch = match else_branch {
                    Some(branch) => Some(self.walk_list(branch)?),
                    None => None,
                };
                NodeKind::If {
                    condition,
                    then_branch,
                    else_branch,
                }
            }
            NodeKind::While { condition, body } => {
                let condition = self.required(parent, "condition", condition)?;
                let body = self.walk_list(body)?;
                NodeKind::While { condition, body }
            }
            NodeKind::Block(statements) => NodeKind::Block(self.walk_list(statements)?),
            NodeKind::Function { name, params, body } => {
                let params = self.params(params)?;
                let body = self.walk_list(body)?;
                NodeKind::Function { name, params, body }
            }
            NodeKind::Class {
                name,
                extends,
                members,
            } => NodeKind::Class {
                name,
                extends,
                members: self.walk_list(members)?,
            },

            NodeKind::ClassMethod {
                name,
                visibility,
                is_static,
                params,
                body,
            } => {
                let params = self.params(params)?;
                let body = self.walk_list(body)?;
                NodeKind::ClassMethod {
                    name,
                    visibility,
                    is_static,
                    params,
                    body,
                }
            }
            NodeKind::PropertyDecl {
                name,
                visibility,
                is_static,
                default,
            } => NodeKind::PropertyDecl {
                name,
                visibility,
                is_static,
                default: self.optional(default)?,
            },
            NodeKind::ClassConst {
                name,
                visibility,
                value,
            } => NodeKind::ClassConst {
                name,
                visibility,
                value: self.required(parent, "value", value)?,
            },
        };

        Ok(Node { kind, attrs })
    }
}

// Synthesized replacements carry no position of their own; give them the
// position of the node they stand in for
fn adopt(mut replacement: Node, original: Attributes) -> Node {
    if replacement.attrs.is_empty() {
        replacement.attrs = original;
    }
    replacement
}

// Source code generation from the syntax tree
// Reference code generator: renders rewritten fragments back to source so
// they can be handed to the evaluator, logged, or compared in tests

use super::*;

const INDENT: &str = "    ";

/// Trait for types that can generate their source code representation
pub trait ToSource {
    fn to_source(&self) -> String;
}

/// A statement list renders one statement per line
impl ToSource for [Node] {
    fn to_source(&self) -> String {
        self.iter()
            .map(render_statement)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ToSource for Name {
    fn to_source(&self) -> String {
        if self.fully_qualified {
            format!("\\{self}")
        } else {
            self.to_string()
        }
    }
}

impl ToSource for Literal {
    fn to_source(&self) -> String {
        match self {
            Literal::Int(n) => n.to_string(),
            Literal::Float(f) if f.is_nan() => "NAN".to_string(),
            Literal::Float(f) if f.is_infinite() && *f > 0.0 => "INF".to_string(),
            Literal::Float(f) if f.is_infinite() => "-INF".to_string(),
            Literal::Float(f) if f.fract() == 0.0 => format!("{f:.1}"),
            Literal::Float(f) => f.to_string(),
            Literal::String(s) => format!("'{}'", escape_string(s)),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        }
    }
}

impl ToSource for Arg {
    fn to_source(&self) -> String {
        let prefix = match (self.by_ref, self.unpack) {
            (_, true) => "...",
            (true, false) => "&",
            (false, false) => "",
        };
        format!("{prefix}{}", self.value.to_source())
    }
}

impl ToSource for Param {
    fn to_source(&self) -> String {
        let mut result = String::new();
        if self.by_ref {
            result.push('&');
        }
        if self.variadic {
            result.push_str("...");
        }
        result.push('$');
        result.push_str(&self.name);
        if let Some(default) = &self.default {
            result.push_str(" = ");
            result.push_str(&default.to_source());
        }
        result
    }
}

impl ToSource for Node {
    fn to_source(&self) -> String {
        match &self.kind {
            // Scalars and names
            NodeKind::Literal(literal) => literal.to_source(),
            NodeKind::Variable(name) => format!("${name}"),
            NodeKind::ConstFetch(name) => name.to_source(),

            // Compound expressions
            NodeKind::Array(items) => format!("[{}]", join(items)),
            NodeKind::BinaryOp { op, left, right } => {
                format!("{} {} {}", operand(left), op.symbol(), operand(right))
            }
            NodeKind::UnaryOp { op, operand: inner } => {
                format!("{}{}", op.symbol(), unary_operand(inner))
            }
            NodeKind::Assign { target, value } => {
                format!("{} = {}", target.to_source(), value.to_source())
            }
            NodeKind::FuncCall { callee, args } => {
                let callee = match callee {
                    NameRef::Named(name) => name.to_source(),
                    NameRef::Dynamic(expr) => dereferenceable(expr),
                };
                format!("{callee}({})", join_args(args))
            }

            // Member access
            NodeKind::PropertyFetch { object, name } => {
                format!("{}->{}", dereferenceable(object), member(name))
            }
            NodeKind::MethodCall { object, name, args } => format!(
                "{}->{}({})",
                dereferenceable(object),
                member(name),
                join_args(args)
            ),
            NodeKind::StaticPropertyFetch { class, name } => {
                let name = match name {
                    Ident::Literal(name) => format!("${name}"),
                    Ident::Dynamic(expr) if is_variable(expr) => format!("${}", expr.to_source()),
                    Ident::Dynamic(expr) => format!("${{{}}}", expr.to_source()),
                };
                format!("{}::{name}", class_ref(class))
            }
            NodeKind::StaticCall { class, name, args } => {
                format!("{}::{}({})", class_ref(class), member(name), join_args(args))
            }
            NodeKind::ClassConstFetch { class, name } => {
                format!("{}::{}", class_ref(class), member(name))
            }
            NodeKind::New { class, args } => {
                let class = match class {
                    NameRef::Named(name) => name.to_source(),
                    NameRef::Dynamic(expr) if is_variable(expr) => expr.to_source(),
                    NameRef::Dynamic(expr) => format!("({})", expr.to_source()),
                };
                format!("new {class}({})", join_args(args))
            }

            // Function-like expressions
            NodeKind::Closure {
                params,
                uses,
                is_static,
                body,
            } => {
                let mut result = String::new();
                if *is_static {
                    result.push_str("static ");
                }
                result.push_str(&format!("function ({})", join_params(params)));
                if !uses.is_empty() {
                    let uses = uses
                        .iter()
                        .map(|u| format!("{}${}", if u.by_ref { "&" } else { "" }, u.name))
                        .collect::<Vec<_>>()
                        .join(", ");
                    result.push_str(&format!(" use ({uses})"));
                }
                result.push(' ');
                result.push_str(&braced(body));
                result
            }
            NodeKind::ArrowFunction { params, body } => {
                format!("fn({}) => {}", join_params(params), body.to_source())
            }

            // Statements
            NodeKind::Expression(expr) => format!("{};", expr.to_source()),
            NodeKind::Return(None) => "return;".to_string(),
            NodeKind::Return(Some(value)) => format!("return {};", value.to_source()),
            NodeKind::Echo(values) => format!("echo {};", join(values)),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut result = format!("if ({}) {}", condition.to_source(), braced(then_branch));
                if let Some(else_branch) = else_branch {
                    result.push_str(" else ");
                    result.push_str(&braced(else_branch));
                }
                result
            }
            NodeKind::While { condition, body } => {
                format!("while ({}) {}", condition.to_source(), braced(body))
            }
            NodeKind::Block(statements) => braced(statements),
            NodeKind::Function { name, params, body } => {
                format!("function {name}({})\n{}", join_params(params), braced(body))
            }
            NodeKind::Class {
                name,
                extends,
                members,
            } => {
                let mut result = format!("class {name}");
                if let Some(parent) = extends {
                    result.push_str(&format!(" extends {}", parent.to_source()));
                }
                result.push('\n');
                result.push_str(&braced(members));
                result
            }

            // Class members
            NodeKind::ClassMethod {
                name,
                visibility,
                is_static,
                params,
                body,
            } => format!(
                "{}{}function {name}({})\n{}",
                visibility.keyword(),
                if *is_static { " static " } else { " " },
                join_params(params),
                braced(body)
            ),
            NodeKind::PropertyDecl {
                name,
                visibility,
                is_static,
                default,
            } => {
                let mut result = visibility.keyword().to_string();
                if *is_static {
                    result.push_str(" static");
                }
                result.push_str(&format!(" ${name}"));
                if let Some(default) = default {
                    result.push_str(&format!(" = {}", default.to_source()));
                }
                result.push(';');
                result
            }
            NodeKind::ClassConst {
                name,
                visibility,
                value,
            } => format!("{} const {name} = {};", visibility.keyword(), value.to_source()),
        }
    }
}

// Statement position: leading comments, and a terminating `;` for bare
// expressions sitting directly in a statement list
fn render_statement(node: &Node) -> String {
    let mut result = String::new();
    for comment in &node.attrs.comments {
        result.push_str(&format!("// {comment}\n"));
    }
    result.push_str(&node.to_source());
    if node.is_expression() {
        result.push(';');
    }
    result
}

fn braced(statements: &[Node]) -> String {
    if statements.is_empty() {
        return "{\n}".to_string();
    }
    format!("{{\n{}\n}}", indent(&statements.to_source()))
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn join(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(|n| n.to_source())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_args(args: &[Arg]) -> String {
    args.iter()
        .map(|a| a.to_source())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| p.to_source())
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_variable(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Variable(_))
}

// Name after `->` or `::`
fn member(name: &Ident) -> String {
    match name {
        Ident::Literal(name) => name.clone(),
        Ident::Dynamic(expr) if is_variable(expr) => expr.to_source(),
        Ident::Dynamic(expr) => format!("{{{}}}", expr.to_source()),
    }
}

fn class_ref(class: &NameRef) -> String {
    match class {
        NameRef::Named(name) => name.to_source(),
        NameRef::Dynamic(expr) => dereferenceable(expr),
    }
}

// Expressions that can be followed by `->`, `::` or `(` without parentheses
fn dereferenceable(node: &Node) -> String {
    match &node.kind {
        NodeKind::Variable(_)
        | NodeKind::ConstFetch(_)
        | NodeKind::Array(_)
        | NodeKind::Literal(Literal::String(_))
        | NodeKind::FuncCall { .. }
        | NodeKind::PropertyFetch { .. }
        | NodeKind::MethodCall { .. }
        | NodeKind::StaticPropertyFetch { .. }
        | NodeKind::StaticCall { .. }
        | NodeKind::ClassConstFetch { .. } => node.to_source(),
        _ => format!("({})", node.to_source()),
    }
}

fn operand(node: &Node) -> String {
    match &node.kind {
        NodeKind::BinaryOp { .. }
        | NodeKind::Assign { .. }
        | NodeKind::Closure { .. }
        | NodeKind::ArrowFunction { .. } => format!("({})", node.to_source()),
        _ => node.to_source(),
    }
}

// A signed operand after a unary sign would merge into `--`/`++`
fn unary_operand(node: &Node) -> String {
    match &node.kind {
        NodeKind::UnaryOp { .. } => format!("({})", node.to_source()),
        NodeKind::Literal(Literal::Int(n)) if *n < 0 => format!("({n})"),
        NodeKind::Literal(Literal::Float(f)) if f.is_sign_negative() && !f.is_nan() => {
            format!("({})", node.to_source())
        }
        _ => operand(node),
    }
}

fn escape_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\'' => r"\'".to_string(),
            '\\' => r"\\".to_string(),
            c => c.to_string(),
        })
        .collect()
}

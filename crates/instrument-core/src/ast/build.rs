//! Node constructors
//!
//! Shorthand for assembling trees by hand, mainly for tests and for tools
//! that synthesize fragments without going through a parser. Every node is
//! created without attributes.

use super::*;

fn boxed(node: Node) -> Box<Node> {
    Box::new(node)
}

fn args(values: Vec<Node>) -> Vec<Arg> {
    values.into_iter().map(Arg::new).collect()
}

fn class_name(class: &str) -> NameRef {
    NameRef::Named(Name::parse(class))
}

fn ident(name: &str) -> Ident {
    Ident::Literal(name.to_string())
}

// Scalars and names

pub fn int(value: i64) -> Node {
    Node::bare(NodeKind::Literal(Literal::Int(value)))
}

pub fn float(value: f64) -> Node {
    Node::bare(NodeKind::Literal(Literal::Float(value)))
}

pub fn string(value: &str) -> Node {
    Node::bare(NodeKind::Literal(Literal::String(value.to_string())))
}

pub fn boolean(value: bool) -> Node {
    Node::bare(NodeKind::Literal(Literal::Bool(value)))
}

pub fn null() -> Node {
    Node::bare(NodeKind::Literal(Literal::Null))
}

/// `$name`
pub fn var(name: &str) -> Node {
    Node::bare(NodeKind::Variable(name.to_string()))
}

pub fn constant(name: &str) -> Node {
    Node::bare(NodeKind::ConstFetch(Name::parse(name)))
}

// Compound expressions

pub fn array(items: Vec<Node>) -> Node {
    Node::bare(NodeKind::Array(items))
}

pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
    Node::bare(NodeKind::BinaryOp {
        op,
        left: boxed(left),
        right: boxed(right),
    })
}

pub fn unary(op: UnaryOp, operand: Node) -> Node {
    Node::bare(NodeKind::UnaryOp {
        op,
        operand: boxed(operand),
    })
}

pub fn assign(target: Node, value: Node) -> Node {
    Node::bare(NodeKind::Assign {
        target: boxed(target),
        value: boxed(value),
    })
}

/// `name(args)`
pub fn call(name: &str, arguments: Vec<Node>) -> Node {
    Node::bare(NodeKind::FuncCall {
        callee: class_name(name),
        args: args(arguments),
    })
}

/// `$callee(args)`
pub fn call_expr(callee: Node, arguments: Vec<Node>) -> Node {
    Node::bare(NodeKind::FuncCall {
        callee: NameRef::Dynamic(boxed(callee)),
        args: args(arguments),
    })
}

// Member access

/// `$object->name`
pub fn prop(object: Node, name: &str) -> Node {
    Node::bare(NodeKind::PropertyFetch {
        object: boxed(object),
        name: ident(name),
    })
}

/// `$object->$name` / `$object->{expr}`
pub fn prop_dyn(object: Node, name: Node) -> Node {
    Node::bare(NodeKind::PropertyFetch {
        object: boxed(object),
        name: Ident::Dynamic(boxed(name)),
    })
}

pub fn method(object: Node, name: &str, arguments: Vec<Node>) -> Node {
    Node::bare(NodeKind::MethodCall {
        object: boxed(object),
        name: ident(name),
        args: args(arguments),
    })
}

pub fn method_dyn(object: Node, name: Node, arguments: Vec<Node>) -> Node {
    Node::bare(NodeKind::MethodCall {
        object: boxed(object),
        name: Ident::Dynamic(boxed(name)),
        args: args(arguments),
    })
}

/// `Class::$name`
pub fn static_prop(class: &str, name: &str) -> Node {
    Node::bare(NodeKind::StaticPropertyFetch {
        class: class_name(class),
        name: ident(name),
    })
}

/// `$class::$name`
pub fn static_prop_on(class: Node, name: &str) -> Node {
    Node::bare(NodeKind::StaticPropertyFetch {
        class: NameRef::Dynamic(boxed(class)),
        name: ident(name),
    })
}

pub fn static_call(class: &str, name: &str, arguments: Vec<Node>) -> Node {
    Node::bare(NodeKind::StaticCall {
        class: class_name(class),
        name: ident(name),
        args: args(arguments),
    })
}

/// `Class::$name(args)`
pub fn static_call_dyn(class: &str, name: Node, arguments: Vec<Node>) -> Node {
    Node::bare(NodeKind::StaticCall {
        class: class_name(class),
        name: Ident::Dynamic(boxed(name)),
        args: args(arguments),
    })
}

pub fn class_const(class: &str, name: &str) -> Node {
    Node::bare(NodeKind::ClassConstFetch {
        class: class_name(class),
        name: ident(name),
    })
}

/// `new Class(args)`
pub fn new(class: &str, arguments: Vec<Node>) -> Node {
    Node::bare(NodeKind::New {
        class: class_name(class),
        args: args(arguments),
    })
}

/// `new $class(args)`
pub fn new_dyn(class: Node, arguments: Vec<Node>) -> Node {
    Node::bare(NodeKind::New {
        class: NameRef::Dynamic(boxed(class)),
        args: args(arguments),
    })
}

// Function-like

pub fn param(name: &str) -> Param {
    Param {
        name: name.to_string(),
        default: None,
        by_ref: false,
        variadic: false,
    }
}

pub fn param_with_default(name: &str, default: Node) -> Param {
    Param {
        default: Some(default),
        ..param(name)
    }
}

pub fn closure(params: Vec<Param>, body: Vec<Node>) -> Node {
    Node::bare(NodeKind::Closure {
        params,
        uses: Vec::new(),
        is_static: false,
        body,
    })
}

pub fn arrow_fn(params: Vec<Param>, body: Node) -> Node {
    Node::bare(NodeKind::ArrowFunction {
        params,
        body: boxed(body),
    })
}

pub fn function(name: &str, params: Vec<Param>, body: Vec<Node>) -> Node {
    Node::bare(NodeKind::Function {
        name: name.to_string(),
        params,
        body,
    })
}

// Statements

/// Expression statement
pub fn stmt(expr: Node) -> Node {
    Node::statement(expr)
}

pub fn ret(value: Option<Node>) -> Node {
    Node::bare(NodeKind::Return(value.map(boxed)))
}

pub fn echo(values: Vec<Node>) -> Node {
    Node::bare(NodeKind::Echo(values))
}

pub fn if_stmt(condition: Node, then_branch: Vec<Node>, else_branch: Option<Vec<Node>>) -> Node {
    Node::bare(NodeKind::If {
        condition: boxed(condition),
        then_branch,
        else_branch,
    })
}

pub fn while_stmt(condition: Node, body: Vec<Node>) -> Node {
    Node::bare(NodeKind::While {
        condition: boxed(condition),
        body,
    })
}

pub fn block(statements: Vec<Node>) -> Node {
    Node::bare(NodeKind::Block(statements))
}

pub fn class(name: &str, extends: Option<&str>, members: Vec<Node>) -> Node {
    Node::bare(NodeKind::Class {
        name: name.to_string(),
        extends: extends.map(Name::parse),
        members,
    })
}

pub fn class_method(name: &str, visibility: Visibility, params: Vec<Param>, body: Vec<Node>) -> Node {
    Node::bare(NodeKind::ClassMethod {
        name: name.to_string(),
        visibility,
        is_static: false,
        params,
        body,
    })
}

pub fn property(name: &str, visibility: Visibility, default: Option<Node>) -> Node {
    Node::bare(NodeKind::PropertyDecl {
        name: name.to_string(),
        visibility,
        is_static: false,
        default: default.map(boxed),
    })
}

pub fn class_const_decl(name: &str, visibility: Visibility, value: Node) -> Node {
    Node::bare(NodeKind::ClassConst {
        name: name.to_string(),
        visibility,
        value: boxed(value),
    })
}

// Syntax tree for interactive code fragments
// Produced by an external parser, rewritten by passes, and rendered back to
// source by a code generator

pub mod build;
pub mod source_gen;
pub use source_gen::ToSource;


use std::fmt;

use serde::{Deserialize, Serialize};

/// Source region a node was parsed from (1-based lines, 0-based columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Zero-width span at a single position
    pub fn point(line: usize, column: usize) -> Self {
        Self::new(line, column, line, column)
    }
}

/// Metadata carried alongside every node
///
/// Passes never inspect attributes; they only move them from the node being
/// replaced onto its replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub span: Option<Span>,
    /// Leading comments, stored without comment markers
    pub comments: Vec<String>,
}

impl Attributes {
    pub fn at(span: Span) -> Self {
        Self {
            span: Some(span),
            comments: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_none() && self.comments.is_empty()
    }

    /// Same position, without formatting hints
    pub fn position_only(&self) -> Self {
        Self {
            span: self.span,
            comments: Vec::new(),
        }
    }
}

/// Namespaced name: `Foo\Bar`, or `\Foo\Bar` when fully qualified
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    pub parts: Vec<String>,
    pub fully_qualified: bool,
}

impl Name {
    /// Parse a backslash-separated name; a leading `\` marks it fully qualified
    pub fn parse(name: &str) -> Self {
        let fully_qualified = name.starts_with('\\');
        let parts = name
            .trim_start_matches('\\')
            .split('\\')
            .map(str::to_string)
            .collect();
        Self {
            parts,
            fully_qualified,
        }
    }

    /// Parse a name and force it to be fully qualified
    pub fn fully_qualified(name: &str) -> Self {
        Self {
            fully_qualified: true,
            ..Self::parse(name)
        }
    }

    /// Check that every segment is a plain identifier
    pub fn is_valid(&self) -> bool {
        !self.parts.is_empty() && self.parts.iter().all(|part| is_identifier(part))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("\\"))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

/// Member name position: `$obj->name` vs `$obj->$name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ident {
    Literal(String),
    Dynamic(Box<Node>),
}

/// Class or function reference position: `Foo::x()` vs `$class::x()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NameRef {
    Named(Name),
    Dynamic(Box<Node>),
}

/// Call argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    pub value: Node,
    pub by_ref: bool,
    /// `...$args`
    pub unpack: bool,
}

impl Arg {
    pub fn new(value: Node) -> Self {
        Self {
            value,
            by_ref: false,
            unpack: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub default: Option<Node>,
    pub by_ref: bool,
    pub variadic: bool,
}

/// Variable captured by a closure: `use ($x, &$y)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureUse {
    pub name: String,
    pub by_ref: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Coalesce,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => ".",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Identical => "===",
            BinaryOp::NotIdentical => "!==",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Coalesce => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// A syntax tree node: its kind plus the attributes that must survive rewriting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub attrs: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    // Scalars and names
    Literal(Literal),
    Variable(String),
    ConstFetch(Name),

    // Compound expressions
    Array(Vec<Node>),
    BinaryOp {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Assign {
        target: Box<Node>,
        value: Box<Node>,
    },
    FuncCall {
        callee: NameRef,
        args: Vec<Arg>,
    },

    // Member access
    PropertyFetch {
        object: Box<Node>,
        name: Ident,
    },
    MethodCall {
        object: Box<Node>,
        name: Ident,
        args: Vec<Arg>,
    },
    StaticPropertyFetch {
        class: NameRef,
        name: Ident,
    },
    StaticCall {
        class: NameRef,
        name: Ident,
        args: Vec<Arg>,
    },
    ClassConstFetch {
        class: NameRef,
        name: Ident,
    },
    New {
        class: NameRef,
        args: Vec<Arg>,
    },

    // Function-like expressions
    Closure {
        params: Vec<Param>,
        uses: Vec<ClosureUse>,
        is_static: bool,
        body: Vec<Node>,
    },
    ArrowFunction {
        params: Vec<Param>,
        body: Box<Node>,
    },

    // Statements
    Expression(Box<Node>),
    Return(Option<Box<Node>>),
    Echo(Vec<Node>),
    If {
        condition: Box<Node>,
        then_branch: Vec<Node>,
        else_branch: Option<Vec<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Vec<Node>,
    },
    Block(Vec<Node>),
    Function {
        name: String,
        params: Vec<Param>,
        body: Vec<Node>,
    },
    Class {
        name: String,
        extends: Option<Name>,
        members: Vec<Node>,
    },

    // Class members
    ClassMethod {
        name: String,
        visibility: Visibility,
        is_static: bool,
        params: Vec<Param>,
        body: Vec<Node>,
    },
    PropertyDecl {
        name: String,
        visibility: Visibility,
        is_static: bool,
        default: Option<Box<Node>>,
    },
    ClassConst {
        name: String,
        visibility: Visibility,
        value: Box<Node>,
    },
}

impl NodeKind {
    /// Stable kind name, used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Literal(_) => "Literal",
            NodeKind::Variable(_) => "Variable",
            NodeKind::ConstFetch(_) => "ConstFetch",
            NodeKind::Array(_) => "Array",
            NodeKind::BinaryOp { .. } => "BinaryOp",
            NodeKind::UnaryOp { .. } => "UnaryOp",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::FuncCall { .. } => "FuncCall",
            NodeKind::PropertyFetch { .. } => "PropertyFetch",
            NodeKind::MethodCall { .. } => "MethodCall",
            NodeKind::StaticPropertyFetch { .. } => "StaticPropertyFetch",
            NodeKind::StaticCall { .. } => "StaticCall",
            NodeKind::ClassConstFetch { .. } => "ClassConstFetch",
            NodeKind::New { .. } => "New",
            NodeKind::Closure { .. } => "Closure",
            NodeKind::ArrowFunction { .. } => "ArrowFunction",
            NodeKind::Expression(_) => "Expression",
            NodeKind::Return(_) => "Return",
            NodeKind::Echo(_) => "Echo",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::Block(_) => "Block",
            NodeKind::Function { .. } => "Function",
            NodeKind::Class { .. } => "Class",
            NodeKind::ClassMethod { .. } => "ClassMethod",
            NodeKind::PropertyDecl { .. } => "PropertyDecl",
            NodeKind::ClassConst { .. } => "ClassConst",
        }
    }

    /// Check if this kind is an expression (vs statement or class member)
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Literal(_)
                | NodeKind::Variable(_)
                | NodeKind::ConstFetch(_)
                | NodeKind::Array(_)
                | NodeKind::BinaryOp { .. }
                | NodeKind::UnaryOp { .. }
                | NodeKind::Assign { .. }
                | NodeKind::FuncCall { .. }
                | NodeKind::PropertyFetch { .. }
                | NodeKind::MethodCall { .. }
                | NodeKind::StaticPropertyFetch { .. }
                | NodeKind::StaticCall { .. }
                | NodeKind::ClassConstFetch { .. }
                | NodeKind::New { .. }
                | NodeKind::Closure { .. }
                | NodeKind::ArrowFunction { .. }
        )
    }

    /// Functions, methods, closures and arrow functions open a new scope
    /// with its own `return`s
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            NodeKind::Closure { .. }
                | NodeKind::ArrowFunction { .. }
                | NodeKind::Function { .. }
                | NodeKind::ClassMethod { .. }
        )
    }
}

impl Node {
    pub fn new(kind: NodeKind, attrs: Attributes) -> Self {
        Self { kind, attrs }
    }

    /// Node without position or formatting hints, for synthesized code
    pub fn bare(kind: NodeKind) -> Self {
        Self::new(kind, Attributes::default())
    }

    /// Wrap an expression in an expression statement at the same position
    pub fn statement(expr: Node) -> Self {
        let attrs = expr.attrs.position_only();
        Self::new(NodeKind::Expression(Box::new(expr)), attrs)
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_expression(&self) -> bool {
        self.kind.is_expression()
    }

    pub fn is_function_like(&self) -> bool {
        self.kind.is_function_like()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_source())
    }
}

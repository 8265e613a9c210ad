/*!
# Call Synthesis

Builders for the calls that instrumentation passes inject into a tree.

Every injected call is a static call on a fully-qualified runtime class
(`\Target::method(args...)`), so rewritten trees stay inside the grammar the
code generator already understands.
*/

use crate::ast::{Arg, Attributes, Ident, Literal, Name, NameRef, Node, NodeKind};

/// A call to `method` on the runtime class `target`
///
/// Arguments are moved in, never copied or altered.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedCall {
    target: Name,
    method: String,
    args: Vec<Arg>,
}

impl QualifiedCall {
    pub fn new(target: Name, method: impl Into<String>) -> Self {
        Self {
            target: Name {
                fully_qualified: true,
                ..target
            },
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Append a plain positional argument
    pub fn arg(mut self, value: Node) -> Self {
        self.args.push(Arg::new(value));
        self
    }

    /// Append already-formed arguments, keeping their by-ref and unpack flags
    pub fn with_args(mut self, args: impl IntoIterator<Item = Arg>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn target(&self) -> &Name {
        &self.target
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn into_node(self, attrs: Attributes) -> Node {
        Node::new(
            NodeKind::StaticCall {
                class: NameRef::Named(self.target),
                name: Ident::Literal(self.method),
                args: self.args,
            },
            attrs,
        )
    }

    /// Build the call at the position of the node it stands in for
    pub fn positioned_like(self, reference: &Node) -> Node {
        let attrs = reference.attrs.position_only();
        self.into_node(attrs)
    }
}

pub fn string_literal(value: impl Into<String>) -> Node {
    Node::bare(NodeKind::Literal(Literal::String(value.into())))
}

/// Member name as a call argument
///
/// Literal identifiers become string literals; dynamic name expressions are
/// passed through as they are.
pub fn member_argument(name: Ident) -> Node {
    match name {
        Ident::Literal(name) => string_literal(name),
        Ident::Dynamic(expr) => *expr,
    }
}

/// Class reference as a call argument
///
/// Literal class names become string literals (without a leading separator);
/// dynamic class expressions are passed through as they are.
pub fn class_argument(class: NameRef) -> Node {
    match class {
        NameRef::Named(name) => string_literal(name.to_string()),
        NameRef::Dynamic(expr) => *expr,
    }
}

/// The "no value" marker expression: `new \Marker()`
pub fn sentinel(marker: &Name) -> Node {
    Node::bare(NodeKind::New {
        class: NameRef::Named(Name {
            fully_qualified: true,
            ..marker.clone()
        }),
        args: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::{Span, ToSource};

    #[test]
    fn test_qualified_call_is_fully_qualified() {
        let call = QualifiedCall::new(Name::parse("Runtime\\Timer"), "markStart");
        assert_eq!(call.target().to_source(), "\\Runtime\\Timer");
        assert_eq!(
            call.into_node(Attributes::default()).to_source(),
            "\\Runtime\\Timer::markStart()"
        );
    }

    #[test]
    fn test_arguments_keep_order_and_flags() {
        let mut spread = Arg::new(var("rest"));
        spread.unpack = true;

        let call = QualifiedCall::new(Name::parse("R"), "callMethod")
            .arg(var("a"))
            .arg(string_literal("b"))
            .with_args(vec![spread]);

        assert_eq!(call.args().len(), 3);
        assert_eq!(
            call.into_node(Attributes::default()).to_source(),
            "\\R::callMethod($a, 'b', ...$rest)"
        );
    }

    #[test]
    fn test_positioned_like_copies_span_only() {
        let reference = var("a")
            .with_attrs(Attributes::at(Span::new(3, 4, 3, 6)).with_comment("note"));
        let node = QualifiedCall::new(Name::parse("R"), "m").positioned_like(&reference);

        assert_eq!(node.attrs.span, Some(Span::new(3, 4, 3, 6)));
        assert!(node.attrs.comments.is_empty());
    }

    #[test]
    fn test_member_and_class_arguments() {
        assert_eq!(member_argument(Ident::Literal("b".into())).to_source(), "'b'");
        assert_eq!(member_argument(Ident::Dynamic(Box::new(var("b")))).to_source(), "$b");
        assert_eq!(
            class_argument(NameRef::Named(Name::parse("\\App\\Model"))).to_source(),
            "'App\\\\Model'"
        );
        assert_eq!(class_argument(NameRef::Dynamic(Box::new(var("a")))).to_source(), "$a");
    }

    #[test]
    fn test_sentinel() {
        let marker = Name::parse("Runtime\\NoReturnValue");
        assert_eq!(sentinel(&marker).to_source(), "new \\Runtime\\NoReturnValue()");
    }
}

//! Parse, instrument and regenerate a code fragment
//!
//! The parser and code generator are external collaborators behind the
//! `FragmentParser` and `CodeGenerator` traits; `SourceGenerator` renders
//! trees with the crate's own `ToSource` implementation.

use tracing::debug;

use crate::ast::{Node, ToSource};
use crate::passes::{BypassPass, TimingPass};
use crate::traverser::{TraversalSummary, Traverser};
use crate::{InstrumentConfig, InstrumentError, Result};

/// Turns a code fragment into top-level statements
pub trait FragmentParser {
    /// Parse a fragment. A fragment cut off before its end should fail with
    /// `ParseError::UnexpectedEof` so the caller can retry it.
    fn parse(&mut self, code: &str) -> anyhow::Result<Vec<Node>>;

    /// Get parser name for debugging
    fn name(&self) -> &'static str;
}

/// Turns rewritten statements back into code
pub trait CodeGenerator {
    fn generate(&self, nodes: &[Node]) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceGenerator;

impl CodeGenerator for SourceGenerator {
    fn generate(&self, nodes: &[Node]) -> String {
        nodes.to_source()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Syntax error, unexpected EOF")]
    UnexpectedEof,

    #[error("Syntax error: {message}{}", on_line(.line))]
    Syntax {
        message: String,
        line: Option<usize>,
    },
}

fn on_line(line: &Option<usize>) -> String {
    line.map(|line| format!(" on line {line}")).unwrap_or_default()
}

/// Parser, passes and generator wired together
pub struct Instrumenter<P, G = SourceGenerator> {
    parser: P,
    generator: G,
    traverser: Traverser,
}

impl<P: FragmentParser> Instrumenter<P> {
    /// Wrap fragments in `markStart()` / `markEnd()` timer calls
    pub fn timing(parser: P, config: &InstrumentConfig) -> Self {
        let traverser = Traverser::new().with_pass(TimingPass::new(config));
        Self::new(parser, SourceGenerator, traverser)
    }

    /// Route member access through the bypass runtime
    pub fn bypass(parser: P, config: &InstrumentConfig) -> Self {
        let traverser = Traverser::new().with_pass(BypassPass::new(config));
        Self::new(parser, SourceGenerator, traverser)
    }
}

impl<P: FragmentParser, G: CodeGenerator> Instrumenter<P, G> {
    pub fn new(parser: P, generator: G, traverser: Traverser) -> Self {
        Self {
            parser,
            generator,
            traverser,
        }
    }

    pub fn traverser(&self) -> &Traverser {
        &self.traverser
    }

    pub fn last_summary(&self) -> Option<TraversalSummary> {
        self.traverser.last_summary()
    }

    /// Parse `code`, run every pass over it and generate the result
    pub fn instrument(&mut self, code: &str) -> Result<String> {
        let nodes = self.parse(code)?;
        self.instrument_nodes(nodes)
    }

    pub fn instrument_nodes(&mut self, nodes: Vec<Node>) -> Result<String> {
        let nodes = self.traverser.traverse(nodes)?;
        Ok(self.generator.generate(&nodes))
    }

    // Interactive input often leaves off the final `;`. Give such fragments
    // one more chance with it appended.
    fn parse(&mut self, code: &str) -> Result<Vec<Node>> {
        match self.parser.parse(code) {
            Ok(nodes) => Ok(nodes),
            Err(e) if is_unexpected_eof(&e) => {
                debug!(parser = self.parser.name(), "unexpected EOF, retrying with ';' appended");
                self.parser
                    .parse(&format!("{code};"))
                    .map_err(InstrumentError::Parse)
            }
            Err(e) => Err(InstrumentError::Parse(e)),
        }
    }
}

fn is_unexpected_eof(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<ParseError>(),
        Some(ParseError::UnexpectedEof)
    )
}

//! # Instrument Core
//!
//! Syntax-tree instrumentation for interactive code fragments, including:
//! - Syntax tree definitions and a reference source generator
//! - A depth-first traverser driving ordered rewriting passes
//! - The timing pass (`markStart()` / `markEnd()` brackets)
//! - The access-bypass pass (member access through reflection helpers)
//! - Runtime timer support and the parse / instrument / generate pipeline
//!
//! Parsing and evaluation are left to the surrounding tools; this crate only
//! rewrites trees.

#![warn(clippy::all)]

pub mod ast;
pub mod passes;
pub mod pipeline;
pub mod runtime;
pub mod synth;
pub mod traverser;

// Re-export commonly used types
pub use ast::{Attributes, Node, NodeKind, Span, ToSource};
pub use passes::{BypassOp, BypassPass, TimingPass};
pub use pipeline::{CodeGenerator, FragmentParser, Instrumenter, ParseError, SourceGenerator};
pub use runtime::{NoReturnValue, Timer, TimerHandle, TimingReport};
pub use synth::QualifiedCall;
pub use traverser::{
    traverse, EnterAction, LeaveAction, Pass, TraversalSummary, TraverseError, Traverser,
};

use serde::{Deserialize, Serialize};

use ast::Name;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for instrumentation components
///
/// Honours `RUST_LOG`; defaults to `instrument_core=info`. Calling it more
/// than once is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("instrument_core=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Names of the runtime classes the passes call into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Target of `markStart()` / `markEnd()`
    pub timer_class: String,
    /// Target of the access-bypass calls
    pub bypass_class: String,
    /// Class constructed when `markEnd` has no value to pass through
    pub no_return_value_class: String,
    /// Rewrite `new` expressions to `newInstance(...)`
    pub rewrite_construction: bool,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            timer_class: "Instrument\\Timer".to_string(),
            bypass_class: "Instrument\\Bypass".to_string(),
            no_return_value_class: "Instrument\\NoReturnValue".to_string(),
            rewrite_construction: true,
        }
    }
}

impl InstrumentConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| InstrumentError::Config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("timer_class", &self.timer_class),
            ("bypass_class", &self.bypass_class),
            ("no_return_value_class", &self.no_return_value_class),
        ] {
            if !Name::parse(value).is_valid() {
                return Err(InstrumentError::Config(format!(
                    "{field} is not a valid class name: '{value}'"
                )));
            }
        }
        Ok(())
    }

    pub fn timer_name(&self) -> Name {
        Name::fully_qualified(&self.timer_class)
    }

    pub fn bypass_name(&self) -> Name {
        Name::fully_qualified(&self.bypass_class)
    }

    pub fn no_return_value_name(&self) -> Name {
        Name::fully_qualified(&self.no_return_value_class)
    }
}

/// Error types for instrumentation
#[derive(thiserror::Error, Debug)]
pub enum InstrumentError {
    #[error("Could not parse code for instrumentation: {0}")]
    Parse(#[from] anyhow::Error),

    #[error("Traversal error: {0}")]
    Traverse(#[from] TraverseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, InstrumentError>;

//! Runtime support for instrumented code
//!
//! Rust-side counterparts of the calls the passes inject: the timer that
//! `markStart()` / `markEnd()` talk to, the marker used when a fragment ends
//! without a value, and the report printed after a timed run.

pub mod timer;

pub use timer::{Timer, TimerHandle, TimingReport};

/// Marker passed to `markEnd` when the fragment produced no value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoReturnValue;

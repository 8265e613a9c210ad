/*!
# Instrumentation Passes

- `TimingPass`: brackets a fragment with `markStart()` / `markEnd(...)` timer
  calls, instrumenting top-level `return`s in place
- `BypassPass`: turns member, static and constant access into calls on the
  bypass runtime, which performs them through reflection
*/

pub mod bypass;
pub mod timing;

pub use bypass::{BypassOp, BypassPass};
pub use timing::TimingPass;

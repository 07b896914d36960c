//! # Reagent Agent
//!
//! The control loops: parse what the model wants, dispatch it, feed the
//! result back, and stop on a final answer or the iteration bound.
//!
//! Three loops are provided:
//! - [`ReactAgent`] — single-action reasoning (Thought / Action /
//!   Observation, one tool call per iteration, `Finish[answer]` ends it)
//! - [`ToolCallAgent`] — conversational multi-call protocol using inline
//!   `[TOOL_CALL:name:params]` tags, any number per turn
//! - [`ReflectionAgent`] — draft / critique / refine self-improvement
//!
//! All loops share the [`Dispatcher`] (timeouts and failure containment)
//! and the parser, and depend only on the `reagent-core` traits.

pub mod dispatcher;
pub mod parser;
pub mod prompts;
pub mod react;
pub mod reflection;
pub mod tool_call;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use dispatcher::Dispatcher;
pub use parser::{Intent, InlineCall, ParsedResponse};
pub use react::{ReactAgent, ReactOutcome, StopReason};
pub use reflection::{ReflectionAgent, ReflectionOutcome};
pub use tool_call::{ToolCallAgent, ToolCallOutcome};

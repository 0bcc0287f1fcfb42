//! Tool abstraction
//!
//! A tool declares a parameter list and a run behaviour; the execution
//! engine drives validation, progress, and cancellation around it.

mod context;
mod info;
mod state;
#[allow(clippy::module_inception)]
mod tool;

pub use context::{ExecutionContext, ProgressCallback};
pub use info::ToolInfo;
pub use state::RunState;
pub use tool::{BoxedTool, Tool, ToolFailure};

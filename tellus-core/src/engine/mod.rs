//! Execution engine
//!
//! Orchestrates one tool run end to end: parameter binding, validation,
//! output ownership, the run itself with progress and cancellation, and
//! provenance recording into the produced objects.

#[allow(clippy::module_inception)]
mod engine;
mod outcome;

pub use engine::{ExecutionEngine, RunOptions};
pub use outcome::{ExecutionOutcome, ExecutionStatus};

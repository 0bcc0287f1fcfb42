//! Parameter system
//!
//! Typed, constrained slots describing a tool's inputs and outputs. Setting
//! a value is provisional and type-coercing; constraints are enforced at
//! validation time, immediately before a run.

mod list;
mod parameter;
mod validation;
mod value;

pub use list::ParameterList;
pub use parameter::{ChoiceSource, Parameter, ParameterKind};
pub use validation::{IssueCode, ValidationIssue, ValidationReport};
pub use value::ParameterValue;

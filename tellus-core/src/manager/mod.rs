//! Tool library manager
//!
//! Process-wide registry of loaded libraries: discovery over configured
//! search paths, load/unload, and tool lookup for every caller. One
//! manager per process is the deployment convention; nothing enforces it
//! at the language level, callers pass the instance around explicitly.

mod in_flight;
#[allow(clippy::module_inception)]
mod manager;
mod report;

pub use in_flight::{InFlight, RunGuard};
pub use manager::ToolLibraryManager;
pub use report::{CandidateReport, InitReport, LoadOutcome};

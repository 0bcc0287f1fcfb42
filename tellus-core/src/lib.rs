//! # Tellus - A Geoscientific Tool Runtime
//!
//! Tellus is a library manager and execution runtime for geoscientific
//! processing tools:
//! - Tool libraries discovered from manifests or linked in statically
//! - Typed, constrained parameter lists with full validation reports
//! - A session data store with reference counts and output ownership
//! - Cooperative cancellation and progress through one checkpoint call
//! - Append-only provenance history on every produced data object
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tellus_core::prelude::*;
//! use serde_json::{json, Map};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Bootstrap a session; autoload scans the configured search paths.
//!     let config = TellusConfig::load()?;
//!     let loader = ManifestLoader::new();
//!     let (env, report) = Environment::initialize(config, &loader).await?;
//!     for line in report.summary_lines() {
//!         println!("{line}");
//!     }
//!
//!     // Run a tool by library and tool identifier.
//!     let mut values = Map::new();
//!     values.insert("steps".into(), json!(10));
//!     let outcome = env
//!         .execute("demo", "steps", values, RunOptions::default())
//!         .await;
//!     println!("{:?}", outcome.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Libraries**: `*.toollib` manifests resolved against registered tool
//!   factories, or [`library::StaticLoader`] for linked-in tools
//! - **Manager**: idempotent scans, last-loaded-wins identifier collisions,
//!   unload refused while a library's tools are running
//! - **Engine**: binds and validates parameters, claims output objects,
//!   runs the tool, records history on success
//! - **Data**: kind-tagged objects with projections, table fields, and an
//!   immutable provenance log

pub mod config;
pub mod data;
pub mod engine;
pub mod env;
pub mod error;
pub mod library;
pub mod manager;
pub mod messages;
pub mod params;
pub mod tool;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{TellusConfig, TOOL_PATH_ENV};
    pub use crate::data::{
        DataKind, DataObject, DataStore, History, HistoryEntry, ObjectId, SharedObject,
        SpatialReference,
    };
    pub use crate::engine::{ExecutionEngine, ExecutionOutcome, ExecutionStatus, RunOptions};
    pub use crate::env::Environment;
    pub use crate::error::{Result, TellusError};
    pub use crate::library::{
        LibraryLoader, LibraryManifest, LoadError, ManifestLoader, StaticLoader, ToolFactory,
        ToolLibrary,
    };
    pub use crate::manager::{InitReport, LoadOutcome, ToolLibraryManager};
    pub use crate::messages::{BufferSink, MessageLevel, MessageSink, SharedSink, TracingSink};
    pub use crate::params::{
        ChoiceSource, IssueCode, Parameter, ParameterKind, ParameterList, ParameterValue,
        ValidationIssue, ValidationReport,
    };
    pub use crate::tool::{
        BoxedTool, ExecutionContext, ProgressCallback, RunState, Tool, ToolFailure, ToolInfo,
    };
}

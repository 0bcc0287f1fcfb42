//! Tool libraries and the loader capability
//!
//! A library is a named, versioned collection of tools loaded as a unit.
//! The manager depends only on the [`LibraryLoader`] capability, so the
//! discovery and registry logic stays agnostic of how tools actually come
//! into the process: parsed manifests resolving registered constructors, or
//! statically linked registrations.

mod library;
mod loader;
mod manifest;

pub use library::ToolLibrary;
pub use loader::{LibraryLoader, LoadError, ManifestLoader, StaticLoader, ToolFactory};
pub use manifest::{LibraryManifest, MANIFEST_EXTENSION, SUPPORTED_API};

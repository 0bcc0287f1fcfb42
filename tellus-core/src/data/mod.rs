//! Data object model
//!
//! Typed containers for rasters, vector features, tables, and point clouds,
//! with shared metadata: projection, provenance history, and ownership
//! tracked by the session [`DataStore`].

mod history;
mod object;
mod store;

pub use history::{History, HistoryEntry};
pub use object::{DataKind, DataObject, ObjectId, SpatialReference};
pub use store::{DataStore, SharedObject};

//! Session environment
//!
//! One-call bootstrap for embedders: build the store, the manager, and the
//! engine, then scan the configured search paths for tool libraries. This
//! is the entry point scripting front ends go through.

mod environment;

pub use environment::Environment;

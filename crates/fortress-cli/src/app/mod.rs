//! Application-level utilities for the Fortress CLI.
//!
//! This module provides:
//! - Path resolution for config and store files
//! - The per-invocation context and the opened workspace

mod context;
mod resolver;

// Re-export public API
pub use context::{AppContext, Workspace};
pub use resolver::resolve_config_path;

#[cfg(test)]
pub(crate) use context::test_support;

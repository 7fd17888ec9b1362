//! Trace utilities

/// Trace category for event dispatch.
pub const EVENTS: &str = "events";
/// Trace category for reporters.
pub const REPORTER: &str = "reporter";
/// Trace category for tree traversal.
pub const RUNNER: &str = "runner";
/// Trace category for tree construction.
pub const TREE: &str = "tree";

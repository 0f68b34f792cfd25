//! workflow-emit — materialize compiled workflow trees on disk.
//!
//! Writes each (sub)workflow's compiled document and default inputs to a
//! deterministic location, never emitting YAML anchors, and threads
//! invocation context (cache dir, home dir, root workflow location) through
//! arbitrarily deep subworkflow nesting.

pub mod cli;
pub mod core;
pub mod logging;

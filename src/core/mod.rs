//! Core logic — types, config store, context injection, tree writing.

pub mod config;
pub mod context;
pub mod error;
pub mod pairs;
pub mod paths;
pub mod types;
pub mod writer;

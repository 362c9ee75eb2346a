//! CLI command implementations

pub mod content;

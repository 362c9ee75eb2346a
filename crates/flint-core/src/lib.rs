//! Flint Core - Foundational types for the Flint content runtime
//!
//! This crate provides the core types that all other Flint crates depend on:
//! - `ResourceId` / `IdAllocator` - Native resource identities
//! - `ResourceKind` - Texture, font atlas and audio clip kinds
//! - Error types, error categories and Result alias

mod error;
mod id;
mod types;

pub use error::{ErrorCategory, FlintError, Result};
pub use id::{IdAllocator, ResourceId};
pub use types::ResourceKind;

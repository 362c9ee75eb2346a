//! Flint Asset - Keyed content caches
//!
//! This crate turns content identifiers (`/art/hero.png`,
//! `/fonts/Inter.ttf|size:14`, `/sfx/door.ogg|streaming`) into canonical
//! cache keys and typed requests, and holds one shared instance per key.
//! Disposal of native handles is announced through
//! [`flint_runtime::DisposalNotifier`].

mod cache;
mod caches;
mod config;
mod factory;
mod metadata;
mod resolver;
mod texture;
mod types;

pub use cache::ResourceCache;
pub use caches::ContentCaches;
pub use config::ContentRules;
pub use factory::{CachedResource, DiskProbe, FileProbe, ResourceFactory, ResourceHandle};
pub use metadata::{MetadataKeyParser, ParsedIdentifier};
pub use resolver::CacheKeyResolver;
pub use texture::{ImageTextureFactory, TextureData};
pub use types::{AudioBufferType, CacheKey, ResolvedKey, ResourceRequest};

//! Collaborator seams: resource construction and file existence

use crate::types::ResourceRequest;
use flint_core::{ResourceId, ResourceKind, Result};
use std::path::Path;

/// A constructed, natively-backed resource that a cache can hold
pub trait CachedResource: Send + Sync + 'static {
    /// Native identity, reported in disposal notifications
    fn id(&self) -> ResourceId;

    fn kind(&self) -> ResourceKind;

    fn source_path(&self) -> &Path;

    /// Whether this resource can serve `request`. Requests that share a cache
    /// key may still differ in construction options (e.g. audio buffer type).
    fn satisfies(&self, _request: &ResourceRequest) -> bool {
        true
    }
}

/// Builds the native resource for a validated request.
///
/// Called at most once per cache entry. Errors are returned to the caller of
/// `ResourceCache::get_item` unchanged.
pub trait ResourceFactory: Send + Sync {
    type Resource: CachedResource;

    fn create(&self, request: &ResourceRequest) -> Result<Self::Resource>;
}

/// Existence check performed before construction
pub trait FileProbe: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

impl<F> FileProbe for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Checks the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProbe;

impl FileProbe for DiskProbe {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Minimal resource record for factories whose native object lives elsewhere
/// (a GPU texture table, an audio device's buffer list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    pub id: ResourceId,
    pub request: ResourceRequest,
}

impl ResourceHandle {
    pub fn new(id: ResourceId, request: ResourceRequest) -> Self {
        Self { id, request }
    }
}

impl CachedResource for ResourceHandle {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn kind(&self) -> ResourceKind {
        self.request.kind()
    }

    fn source_path(&self) -> &Path {
        self.request.path()
    }

    fn satisfies(&self, request: &ResourceRequest) -> bool {
        &self.request == request
    }
}

//! Native resource identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a natively-backed resource (texture, font atlas, audio clip).
///
/// Assigned by whichever factory constructs the resource and carried through
/// disposal notifications so the owning subsystem knows what to tear down.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// Create a ResourceId from a raw value (for deserialization/testing)
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing id source.
///
/// Each allocator is independent; share one through an `Arc` among the
/// factories that must not hand out overlapping ids.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Create an allocator whose first id is 1
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Take the next unused id
    pub fn allocate(&self) -> ResourceId {
        ResourceId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        let ids = IdAllocator::new();
        let id1 = ids.allocate();
        let id2 = ids.allocate();
        assert_ne!(id1, id2);
        assert!(id2.0 > id1.0);
        assert_eq!(id1.raw(), 1);
        assert_eq!(ids.allocated(), 2);
    }

    #[test]
    fn test_allocators_are_isolated() {
        let a = IdAllocator::new();
        let b = IdAllocator::new();
        a.allocate();
        a.allocate();
        assert_eq!(b.allocate(), ResourceId::from_raw(1));
    }

}

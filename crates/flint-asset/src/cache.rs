//! Keyed resource cache with single-flight construction
//!
//! Each key owns a slot that is inserted *before* construction starts. Racing
//! callers for the same key block on that slot, so the factory runs once per
//! entry and its side effects (id assignment, native allocation) are never
//! duplicated. Removal only publishes a [`DisposalNotification`]; the native
//! handle is destroyed by whoever subscribes to the notifier.

use crate::config::ContentRules;
use crate::factory::{CachedResource, FileProbe, ResourceFactory};
use crate::resolver::CacheKeyResolver;
use crate::types::{CacheKey, ResolvedKey, ResourceRequest};
use flint_core::{FlintError, ResourceKind, Result};
use flint_runtime::{DisposalNotification, DisposalNotifier, ShutdownSignal};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Storage for one key. Empty while the first construction is in flight.
struct Slot<R> {
    cell: OnceCell<Arc<R>>,
    /// Set by whoever publishes this slot's disposal, so it happens once
    disposed: AtomicBool,
}

impl<R> Slot<R> {
    fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            disposed: AtomicBool::new(false),
        }
    }

    fn ready(&self) -> Option<&Arc<R>> {
        self.cell.get()
    }

    /// True for exactly one caller
    fn claim_disposal(&self) -> bool {
        !self.disposed.swap(true, Ordering::AcqRel)
    }
}

/// Concurrent cache of one resource kind, keyed by canonical [`CacheKey`]
pub struct ResourceCache<F: ResourceFactory> {
    kind: ResourceKind,
    resolver: CacheKeyResolver,
    factory: F,
    probe: Arc<dyn FileProbe>,
    notifier: Arc<DisposalNotifier>,
    entries: RwLock<HashMap<String, Arc<Slot<F::Resource>>>>,
    shut_down: AtomicBool,
    shutdown_attached: AtomicBool,
}

impl<F: ResourceFactory> ResourceCache<F> {
    pub fn new(
        kind: ResourceKind,
        rules: ContentRules,
        factory: F,
        probe: Arc<dyn FileProbe>,
        notifier: Arc<DisposalNotifier>,
    ) -> Result<Self> {
        Ok(Self {
            kind,
            resolver: CacheKeyResolver::new(rules)?,
            factory,
            probe,
            notifier,
            entries: RwLock::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
            shutdown_attached: AtomicBool::new(false),
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn notifier(&self) -> &Arc<DisposalNotifier> {
        &self.notifier
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Validate an identifier and compute its key without loading anything
    pub fn resolve(&self, identifier: &str) -> Result<ResolvedKey> {
        self.resolver.resolve_identifier(identifier, self.kind)
    }

    /// Return the cached resource for `identifier`, constructing it on first use.
    ///
    /// Validation errors are returned before storage is touched. On a miss the
    /// file must exist, then the factory builds the resource; a failed build
    /// leaves no entry behind.
    pub fn get_item(&self, identifier: &str) -> Result<Arc<F::Resource>> {
        if self.is_shut_down() {
            return Err(FlintError::CacheShutDown(self.kind));
        }

        let ResolvedKey { key, request } = self.resolve(identifier)?;
        let slot = self.slot_for(key.as_str())?;

        let mut constructed = false;
        let result = slot.cell.get_or_try_init(|| {
            constructed = true;
            self.construct(&key, &request).map(Arc::new)
        });

        let resource = match result {
            Ok(resource) => Arc::clone(resource),
            Err(err) => {
                self.discard_failed(key.as_str(), &slot);
                return Err(err);
            }
        };

        if constructed {
            self.settle(&key, &slot, &resource)?;
            tracing::debug!(kind = %self.kind, key = %key, id = %resource.id(), "cached");
        } else {
            tracing::trace!(kind = %self.kind, key = %key, "hit");
            if !resource.satisfies(&request) {
                tracing::warn!(
                    kind = %self.kind,
                    key = %key,
                    requested = %request,
                    "returning cached instance built with different options"
                );
            }
        }

        Ok(resource)
    }

    /// Remove a cached entry and announce its disposal.
    ///
    /// Unknown keys and keys still under construction are ignored. Returns
    /// whether an entry was removed.
    pub fn unload(&self, key: &str) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            match entries.get(key) {
                Some(slot) if slot.ready().is_some() => entries.remove(key),
                _ => None,
            }
        };

        let Some(slot) = removed else {
            tracing::trace!(kind = %self.kind, key, "unload of absent key");
            return false;
        };

        if let Some(resource) = slot.ready() {
            if slot.claim_disposal() {
                tracing::debug!(kind = %self.kind, key, id = %resource.id(), "unloaded");
                self.notify(resource.as_ref());
            }
        }
        true
    }

    /// Drop every entry, publishing one disposal per cached resource.
    ///
    /// Only the first call does anything; afterwards `get_item` fails with
    /// [`FlintError::CacheShutDown`]. Returns the number of disposals published.
    pub fn shutdown(&self) -> usize {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return 0;
        }

        let mut drained: Vec<(String, Arc<Slot<F::Resource>>)> =
            self.entries.write().drain().collect();
        drained.sort_by(|a, b| a.0.cmp(&b.0));

        let mut disposed = 0;
        for (_, slot) in &drained {
            if let Some(resource) = slot.ready() {
                if slot.claim_disposal() {
                    self.notify(resource.as_ref());
                    disposed += 1;
                }
            }
        }

        tracing::info!(kind = %self.kind, disposed, "cache shut down");
        disposed
    }

    /// Run [`shutdown`](Self::shutdown) when `signal` fires. Registers at most once.
    pub fn attach_shutdown(self: &Arc<Self>, signal: &ShutdownSignal)
    where
        F: 'static,
    {
        if self.shutdown_attached.swap(true, Ordering::SeqCst) {
            return;
        }
        let cache = Arc::downgrade(self);
        signal.on_shutdown(format!("{} cache", self.kind), move || {
            if let Some(cache) = cache.upgrade() {
                cache.shutdown();
            }
        });
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Number of constructed entries
    pub fn total_cached_items(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|slot| slot.ready().is_some())
            .count()
    }

    /// Snapshot of the keys of constructed entries, sorted
    pub fn cache_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .iter()
            .filter(|(_, slot)| slot.ready().is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Check if a constructed entry exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .get(key)
            .is_some_and(|slot| slot.ready().is_some())
    }

    fn slot_for(&self, key: &str) -> Result<Arc<Slot<F::Resource>>> {
        let existing = self.entries.read().get(key).cloned();
        if let Some(slot) = existing {
            return Ok(slot);
        }

        let mut entries = self.entries.write();
        // Checked under the lock so nothing is inserted after shutdown drained
        if self.is_shut_down() {
            return Err(FlintError::CacheShutDown(self.kind));
        }
        let slot = entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Slot::new()));
        Ok(Arc::clone(slot))
    }

    fn construct(&self, key: &CacheKey, request: &ResourceRequest) -> Result<F::Resource> {
        let path = request.path();
        if !self.probe.exists(path) {
            return Err(FlintError::NotFound(path.to_path_buf()));
        }

        tracing::debug!(kind = %self.kind, key = %key, "constructing");
        let resource = self.factory.create(request)?;
        if resource.kind() != self.kind {
            tracing::warn!(
                expected = %self.kind,
                actual = %resource.kind(),
                key = %key,
                "factory produced a resource of another kind"
            );
        }
        Ok(resource)
    }

    /// After a successful construction, make sure the slot is still the live
    /// entry for its key. A slot drained by `shutdown` while still empty has
    /// nobody left to dispose of it, so its resource is released here.
    fn settle(
        &self,
        key: &CacheKey,
        slot: &Arc<Slot<F::Resource>>,
        resource: &Arc<F::Resource>,
    ) -> Result<()> {
        let registered = self
            .entries
            .read()
            .get(key.as_str())
            .is_some_and(|current| Arc::ptr_eq(current, slot));
        if registered {
            return Ok(());
        }

        if slot.claim_disposal() {
            tracing::warn!(
                kind = %self.kind,
                key = %key,
                id = %resource.id(),
                "construction finished after shutdown; releasing"
            );
            self.notify(resource.as_ref());
            return Err(FlintError::CacheShutDown(self.kind));
        }

        // Already disposed by an unload or shutdown that saw it cached
        if self.is_shut_down() {
            Err(FlintError::CacheShutDown(self.kind))
        } else {
            Ok(())
        }
    }

    /// Remove an empty slot after a failed construction, unless another caller
    /// is already waiting on it (that caller will retry construction).
    fn discard_failed(&self, key: &str, slot: &Arc<Slot<F::Resource>>) {
        let mut entries = self.entries.write();
        let unused = entries.get(key).is_some_and(|current| {
            Arc::ptr_eq(current, slot) && current.ready().is_none() && Arc::strong_count(current) == 2
        });
        if unused {
            entries.remove(key);
        }
    }

    fn notify(&self, resource: &F::Resource) {
        self.notifier.publish(DisposalNotification {
            kind: resource.kind(),
            id: resource.id(),
            source: resource.source_path().to_path_buf(),
        });
    }
}

//! The three content caches of a running game, wired to one notifier

use crate::cache::ResourceCache;
use crate::config::ContentRules;
use crate::factory::{FileProbe, ResourceFactory};
use flint_core::{ResourceKind, Result};
use flint_runtime::{DisposalNotifier, ShutdownSignal};
use std::sync::Arc;

/// Standard textures, font atlases and audio clips sharing rules, a file
/// probe and a [`DisposalNotifier`]
pub struct ContentCaches<T, F, A>
where
    T: ResourceFactory,
    F: ResourceFactory,
    A: ResourceFactory,
{
    textures: Arc<ResourceCache<T>>,
    fonts: Arc<ResourceCache<F>>,
    audio: Arc<ResourceCache<A>>,
    notifier: Arc<DisposalNotifier>,
}

impl<T, F, A> ContentCaches<T, F, A>
where
    T: ResourceFactory + 'static,
    F: ResourceFactory + 'static,
    A: ResourceFactory + 'static,
{
    pub fn new(
        rules: ContentRules,
        textures: T,
        fonts: F,
        audio: A,
        probe: Arc<dyn FileProbe>,
    ) -> Result<Self> {
        let notifier = Arc::new(DisposalNotifier::new());
        let textures = Arc::new(ResourceCache::new(
            ResourceKind::StandardTexture,
            rules.clone(),
            textures,
            Arc::clone(&probe),
            Arc::clone(&notifier),
        )?);
        let fonts = Arc::new(ResourceCache::new(
            ResourceKind::FontAtlasTexture,
            rules.clone(),
            fonts,
            Arc::clone(&probe),
            Arc::clone(&notifier),
        )?);
        let audio = Arc::new(ResourceCache::new(
            ResourceKind::AudioClip,
            rules,
            audio,
            probe,
            Arc::clone(&notifier),
        )?);

        Ok(Self {
            textures,
            fonts,
            audio,
            notifier,
        })
    }

    pub fn textures(&self) -> &Arc<ResourceCache<T>> {
        &self.textures
    }

    pub fn fonts(&self) -> &Arc<ResourceCache<F>> {
        &self.fonts
    }

    pub fn audio(&self) -> &Arc<ResourceCache<A>> {
        &self.audio
    }

    /// Subscribe here to destroy native handles when entries leave a cache
    pub fn notifier(&self) -> &Arc<DisposalNotifier> {
        &self.notifier
    }

    /// Constructed entries across all three caches
    pub fn total_cached_items(&self) -> usize {
        self.textures.total_cached_items()
            + self.fonts.total_cached_items()
            + self.audio.total_cached_items()
    }

    /// Shut down every cache, textures first. Returns the disposals published.
    pub fn shutdown(&self) -> usize {
        self.textures.shutdown() + self.fonts.shutdown() + self.audio.shutdown()
    }

    /// Register all three caches with the application's shutdown signal
    pub fn attach_shutdown(&self, signal: &ShutdownSignal) {
        self.textures.attach_shutdown(signal);
        self.fonts.attach_shutdown(signal);
        self.audio.attach_shutdown(signal);
    }
}

//! Disposal notifications: logical removal is announced, native teardown happens elsewhere
//!
//! Caches publish a [`DisposalNotification`] when they drop an entry. The
//! subsystem that owns the GPU or audio context subscribes (usually through a
//! [`TeardownQueue`]) and destroys the native handle on its own thread.

use crate::event_bus::{EventBus, SubscriptionId};
use crossbeam::channel::{Receiver, Sender};
use flint_core::{ResourceId, ResourceKind};
use std::path::PathBuf;

/// Announces that a native resource is no longer referenced by any cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisposalNotification {
    pub kind: ResourceKind,
    pub id: ResourceId,
    /// File the resource was built from (diagnostics only)
    pub source: PathBuf,
}

/// Fire-and-forget channel for disposal notifications, keyed by resource kind
#[derive(Default)]
pub struct DisposalNotifier {
    bus: EventBus<ResourceKind, DisposalNotification>,
}

impl DisposalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a notification to every subscriber of its kind.
    /// Returns the number of subscribers reached.
    pub fn publish(&self, notification: DisposalNotification) -> usize {
        let delivered = self.bus.publish(&notification.kind, &notification);
        if delivered == 0 {
            tracing::debug!(
                kind = %notification.kind,
                id = %notification.id,
                "disposal published with no subscriber"
            );
        }
        delivered
    }

    /// Subscribe to disposals of one resource kind
    pub fn subscribe<F>(&self, kind: ResourceKind, handler: F) -> SubscriptionId
    where
        F: Fn(&DisposalNotification) + Send + Sync + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn subscriber_count(&self, kind: ResourceKind) -> usize {
        self.bus.subscriber_count(&kind)
    }
}

/// Hands disposal notifications from any thread to the thread that owns the
/// native context, which drains them once per frame.
pub struct TeardownQueue {
    sender: Sender<DisposalNotification>,
    receiver: Receiver<DisposalNotification>,
}

impl Default for TeardownQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TeardownQueue {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam::channel::unbounded();
        Self { sender, receiver }
    }

    /// Subscribe this queue to a notifier for one resource kind
    pub fn connect(&self, notifier: &DisposalNotifier, kind: ResourceKind) -> SubscriptionId {
        let sender = self.sender.clone();
        notifier.subscribe(kind, move |notification| {
            if sender.send(notification.clone()).is_err() {
                tracing::warn!(
                    id = %notification.id,
                    "teardown queue dropped; native resource will leak"
                );
            }
        })
    }

    /// Take every pending notification, in arrival order
    pub fn drain(&self) -> Vec<DisposalNotification> {
        self.receiver.try_iter().collect()
    }

    /// Number of notifications waiting to be drained
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn note(kind: ResourceKind, id: u64) -> DisposalNotification {
        DisposalNotification {
            kind,
            id: ResourceId::from_raw(id),
            source: PathBuf::from(format!("/content/{}.bin", id)),
        }
    }

    #[test]
    fn test_publish_reaches_kind_subscribers_only() {
        let notifier = DisposalNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        notifier.subscribe(ResourceKind::AudioClip, move |n| s.lock().push(n.id));

        assert_eq!(notifier.publish(note(ResourceKind::StandardTexture, 1)), 0);
        assert_eq!(notifier.publish(note(ResourceKind::AudioClip, 2)), 1);

        assert_eq!(*seen.lock(), vec![ResourceId::from_raw(2)]);
    }

    #[test]
    fn test_teardown_queue_drains_in_order() {
        let notifier = DisposalNotifier::new();
        let queue = TeardownQueue::new();
        queue.connect(&notifier, ResourceKind::StandardTexture);

        for id in 1..=3 {
            notifier.publish(note(ResourceKind::StandardTexture, id));
        }
        assert_eq!(queue.pending(), 3);

        let ids: Vec<u64> = queue.drain().iter().map(|n| n.id.raw()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_teardown_on_owner_thread() {
        let notifier = Arc::new(DisposalNotifier::new());
        let queue = TeardownQueue::new();
        queue.connect(&notifier, ResourceKind::FontAtlasTexture);

        let publishers: Vec<_> = (0..4)
            .map(|t| {
                let notifier = Arc::clone(&notifier);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        notifier.publish(note(ResourceKind::FontAtlasTexture, t * 100 + i));
                    }
                })
            })
            .collect();
        for p in publishers {
            p.join().unwrap();
        }

        // The owning thread is this one
        assert_eq!(queue.drain().len(), 100);
    }

    #[test]
    fn test_unsubscribed_queue_receives_nothing() {
        let notifier = DisposalNotifier::new();
        let queue = TeardownQueue::new();
        let id = queue.connect(&notifier, ResourceKind::AudioClip);
        assert_eq!(notifier.subscriber_count(ResourceKind::AudioClip), 1);

        assert!(notifier.unsubscribe(id));
        notifier.publish(note(ResourceKind::AudioClip, 9));
        assert!(queue.is_empty());
    }
}

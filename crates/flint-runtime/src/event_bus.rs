//! Topic-keyed publish/subscribe bus

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Token returned by [`EventBus::subscribe`], used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Subscriber<T, P> {
    id: SubscriptionId,
    topic: T,
    handler: Handler<P>,
}

/// A typed event bus that delivers payloads to the subscribers of a topic.
///
/// Delivery is a synchronous call-through on the publishing thread, in
/// subscription order. Handlers are invoked after the subscriber list lock is
/// released, so a handler may itself subscribe or unsubscribe.
pub struct EventBus<T, P> {
    subscribers: RwLock<Vec<Subscriber<T, P>>>,
    next_id: AtomicU64,
}

impl<T, P> Default for EventBus<T, P>
where
    T: PartialEq + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> EventBus<T, P>
where
    T: PartialEq + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler for a topic
    pub fn subscribe<F>(&self, topic: T, handler: F) -> SubscriptionId
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(%id, ?topic, "subscribe");
        self.subscribers.write().push(Subscriber {
            id,
            topic,
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a handler. Returns false if the token was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        before != subscribers.len()
    }

    /// Deliver a payload to every current subscriber of `topic`.
    /// Returns the number of handlers invoked.
    pub fn publish(&self, topic: &T, payload: &P) -> usize {
        let handlers: Vec<Handler<P>> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| &s.topic == topic)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        tracing::trace!(?topic, subscribers = handlers.len(), "publish");
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Number of handlers registered for a topic
    pub fn subscriber_count(&self, topic: &T) -> usize {
        self.subscribers
            .read()
            .iter()
            .filter(|s| &s.topic == topic)
            .count()
    }

    /// Check if no handlers are registered at all
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }
}

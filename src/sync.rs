// 🔄 Live Sync - Snapshot delivery to subscribers
//
// A store hands out one `Subscription` per listener. The first item is the
// current snapshot; every later write to the same user's document delivers
// one more. Dropping (or cancelling) the handle unregisters it.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FinanceError;

/// Key under which the financial state lives inside a user document
pub const FINANCIAL_DATA_KEY: &str = "financialData";

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSnapshot {
    /// Document exists; holds the whole top-level object
    Exists(Map<String, Value>),
    Absent,
}

impl DocumentSnapshot {
    pub fn exists(&self) -> bool {
        matches!(self, DocumentSnapshot::Exists(_))
    }

    /// The stored `financialData` value, if the document has one
    pub fn financial_data(&self) -> Option<&Value> {
        match self {
            DocumentSnapshot::Exists(doc) => doc.get(FINANCIAL_DATA_KEY),
            DocumentSnapshot::Absent => None,
        }
    }
}

/// One delivery: a snapshot, or the read error that replaced it
pub type SnapshotEvent = Result<DocumentSnapshot, FinanceError>;

// ============================================================================
// REGISTRY
// ============================================================================

struct Subscriber {
    user_id: String,
    sender: Sender<SnapshotEvent>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    subscribers: HashMap<u64, Subscriber>,
}

/// Live subscribers, keyed by subscription id.
///
/// Stores call `register` from `subscribe` and `publish` after each committed write.
#[derive(Default)]
pub struct SubscriberRegistry {
    inner: Mutex<RegistryInner>,
}

impl SubscriberRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // Registry state stays consistent across a panic, so a poisoned lock is safe to reuse
    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener for `user_id`, queueing `initial` as its first item
    pub fn register(self: &Arc<Self>, user_id: &str, initial: SnapshotEvent) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        // Receiver is alive on the stack, send cannot fail here
        let _ = sender.send(initial);

        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.insert(
            id,
            Subscriber {
                user_id: user_id.to_string(),
                sender,
            },
        );
        debug!(user_id, subscription = id, "subscriber registered");

        Subscription {
            id,
            user_id: user_id.to_string(),
            receiver,
            registry: Arc::downgrade(self),
        }
    }

    /// Deliver `event` to every live subscriber of `user_id`
    pub fn publish(&self, user_id: &str, event: &SnapshotEvent) -> usize {
        let mut inner = self.lock();
        let mut delivered = 0;
        let mut dead = Vec::new();

        for (id, sub) in inner.subscribers.iter() {
            if sub.user_id != user_id {
                continue;
            }
            if sub.sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }

        for id in dead {
            inner.subscribers.remove(&id);
        }

        delivered
    }

    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.lock()
            .subscribers
            .values()
            .filter(|s| s.user_id == user_id)
            .count()
    }

    fn unregister(&self, id: u64) {
        if self.lock().subscribers.remove(&id).is_some() {
            debug!(subscription = id, "subscriber removed");
        }
    }
}

// ============================================================================
// SUBSCRIPTION HANDLE
// ============================================================================

/// Cancellable stream of snapshots for one user.
///
/// Blocking iteration ends once the handle is cancelled and the queue is drained.
pub struct Subscription {
    id: u64,
    user_id: String,
    receiver: Receiver<SnapshotEvent>,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Next queued item without blocking
    pub fn try_next(&self) -> Option<SnapshotEvent> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next item
    pub fn next_timeout(&self, timeout: Duration) -> Option<SnapshotEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Stop delivery. Items already queued can still be drained.
    pub fn cancel(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }
        self.registry = Weak::new();
    }

    pub fn is_active(&self) -> bool {
        self.registry.strong_count() > 0
    }
}

impl Iterator for Subscription {
    type Item = SnapshotEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(income: i64) -> DocumentSnapshot {
        let value = json!({ "financialData": { "monthlyFinances": { "income": income } } });
        match value {
            Value::Object(map) => DocumentSnapshot::Exists(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_initial_item_then_published() {
        let registry = SubscriberRegistry::new();
        let sub = registry.register("u1", Ok(DocumentSnapshot::Absent));

        assert_eq!(sub.try_next(), Some(Ok(DocumentSnapshot::Absent)));
        assert_eq!(sub.try_next(), None);

        assert_eq!(registry.publish("u1", &Ok(doc(10))), 1);
        let event = sub.try_next().unwrap().unwrap();
        assert_eq!(event.financial_data().unwrap()["monthlyFinances"]["income"], 10);
    }

    #[test]
    fn test_publish_is_scoped_to_user() {
        let registry = SubscriberRegistry::new();
        let a = registry.register("alice", Ok(DocumentSnapshot::Absent));
        let b = registry.register("bob", Ok(DocumentSnapshot::Absent));
        a.try_next();
        b.try_next();

        registry.publish("alice", &Ok(doc(1)));

        assert!(a.try_next().is_some());
        assert!(b.try_next().is_none());
    }

    #[test]
    fn test_drop_unregisters() {
        let registry = SubscriberRegistry::new();
        let sub = registry.register("u1", Ok(DocumentSnapshot::Absent));
        assert_eq!(registry.subscriber_count("u1"), 1);

        drop(sub);
        assert_eq!(registry.subscriber_count("u1"), 0);
        assert_eq!(registry.publish("u1", &Ok(doc(1))), 0);
    }

    #[test]
    fn test_cancel_ends_blocking_iteration() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.register("u1", Ok(DocumentSnapshot::Absent));
        registry.publish("u1", &Ok(doc(5)));

        sub.cancel();
        assert!(!sub.is_active());

        // Queued items drain, then the iterator ends instead of blocking
        let drained: Vec<SnapshotEvent> = sub.by_ref().collect();
        assert_eq!(drained.len(), 2);
        assert!(sub.next().is_none());
    }

    #[test]
    fn test_errors_are_delivered_as_items() {
        let registry = SubscriberRegistry::new();
        let sub = registry.register("u1", Err(FinanceError::StorageRead("offline".to_string())));

        let first = sub.next_timeout(Duration::from_millis(50)).unwrap();
        assert!(matches!(first, Err(FinanceError::StorageRead(_))));
        assert!(sub.next_timeout(Duration::from_millis(10)).is_none());
    }
}

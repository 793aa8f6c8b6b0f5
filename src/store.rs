/*!
 * Ordered publish/subscribe primitive.
 *
 * A [`Store`] holds one value. Every update replaces the value under a lock
 * and publishes the new snapshot to every subscriber before the lock is
 * released, so all subscribers see all updates in exactly the order they were
 * applied. Subscriber channels are unbounded: delivery never drops or
 * coalesces values, and publishing never suspends.
 */

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Receiving end of a subscription
pub type Subscription<T> = UnboundedReceiver<T>;

/// Fan-out list of subscriber channels
pub struct Subscribers<T> {
    senders: Vec<UnboundedSender<T>>,
}

impl<T: Clone> Subscribers<T> {
    /// Create an empty subscriber list
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> Subscription<T> {
        let (tx, rx) = unbounded_channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver a value to every live subscriber, dropping closed ones
    pub fn publish(&mut self, value: &T) {
        self.senders.retain(|tx| tx.send(value.clone()).is_ok());
    }

    /// Number of live subscribers
    pub fn len(&self) -> usize {
        self.senders.iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Whether there are no live subscribers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct StoreInner<T> {
    value: T,
    subscribers: Subscribers<T>,
}

/// Single-value store with snapshot-on-read and ordered change delivery
pub struct Store<T> {
    inner: Arc<Mutex<StoreInner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Store<T> {
    /// Create a store holding `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                value,
                subscribers: Subscribers::new(),
            })),
        }
    }

    /// Copy of the current value
    pub fn snapshot(&self) -> T {
        self.inner.lock().value.clone()
    }

    /// Read the current value without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let inner = self.inner.lock();
        f(&inner.value)
    }

    /// Replace the value and publish it
    pub fn set(&self, value: T) {
        self.update(|_| value);
    }

    /// Compute the next value from the current one and publish it
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> T {
        let mut inner = self.inner.lock();
        let next = f(&inner.value);
        inner.value = next.clone();
        inner.subscribers.publish(&next);
        next
    }

    /// Subscribe to every future value
    pub fn subscribe(&self) -> Subscription<T> {
        self.inner.lock().subscribers.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

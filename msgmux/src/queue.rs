//! Bounded drop-oldest FIFO shared by channels and endpoints.

use crate::message::Message;
use std::collections::VecDeque;
use tokio::sync::{Mutex, Notify};
use tokio::time::{Duration, Instant};

/// A message plus the moment it entered its current queue.
///
/// Items are value types: fanning one message out to several endpoints
/// enqueues an independent copy per endpoint, each with its own timestamp.
#[derive(Clone, Debug)]
pub(crate) struct QueuedItem {
    pub(crate) msg: Message,
    pub(crate) enqueued_at: Instant,
}

impl QueuedItem {
    pub(crate) fn new(msg: Message) -> Self {
        Self {
            msg,
            enqueued_at: Instant::now(),
        }
    }

    fn older_than(&self, max_age: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.enqueued_at) > max_age
    }
}

/// Bounded FIFO with drop-oldest backpressure.
///
/// `push` never suspends on a full queue: it evicts as many oldest entries
/// as needed to admit the new item while holding the lock, so the capacity
/// bound holds even with concurrent producers. `pop` suspends until an item
/// is available.
pub(crate) struct MessageQueue {
    capacity: usize,
    items: Mutex<VecDeque<QueuedItem>>,
    available: Notify,
}

impl MessageQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            // A zero bound would make the eviction loop in push spin forever,
            // so the smallest usable queue holds one item.
            capacity: capacity.max(1),
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
        }
    }

    /// Enqueues an item, evicting from the front if full.
    ///
    /// Returns how many items were discarded to make room.
    pub(crate) async fn push(&self, item: QueuedItem) -> usize {
        let mut evicted = 0;
        {
            let mut items = self.items.lock().await;
            while items.len() >= self.capacity {
                items.pop_front();
                evicted += 1;
            }
            items.push_back(item);
        }
        self.available.notify_one();
        evicted
    }

    /// Dequeues the oldest item, suspending while the queue is empty.
    pub(crate) async fn pop(&self) -> QueuedItem {
        loop {
            // Register for a wakeup before checking, otherwise a push between
            // the emptiness check and the await could be missed.
            let notified = self.available.notified();
            if let Some(item) = self.items.lock().await.pop_front() {
                return item;
            }
            notified.await;
        }
    }

    /// Removes every item older than `max_age` without delivering it.
    ///
    /// Returns the number of items discarded.
    pub(crate) async fn evict_expired(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let mut items = self.items.lock().await;
        let before = items.len();
        items.retain(|item| !item.older_than(max_age, now));
        before - items.len()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}

//! Per-session outbound mailbox.
//!
//! Any number of other sessions' handlers push text in with
//! [`Mailbox::enqueue`]; exactly one consumer (the owning connection's
//! delivery path) takes it out again. The consumer chooses how to wait:
//!
//! - **push**: `notified().await`, then drain; woken on every enqueue.
//! - **poll**: drain on a fixed interval, ignoring notifications.
//!
//! Both styles see the same FIFO contents.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// An unbounded FIFO queue of outbound text with a wake-up signal.
#[derive(Debug, Default)]
pub struct Mailbox {
    queue: Mutex<Queue>,
    notify: Notify,
}

#[derive(Debug, Default)]
struct Queue {
    items: VecDeque<String>,
    closed: bool,
}

impl Mailbox {
    /// Creates an empty, open mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text` to the back of the queue.
    ///
    /// Never blocks on the consumer. Returns `false` (and drops the text)
    /// if the mailbox has been closed.
    pub fn enqueue(&self, text: impl Into<String>) -> bool {
        {
            let mut queue = self.queue.lock();
            if queue.closed {
                return false;
            }
            queue.items.push_back(text.into());
        }
        // `notify_one` stores a permit when nobody is waiting yet, so a
        // consumer that calls `notified()` after this still wakes.
        self.notify.notify_one();
        true
    }

    /// Removes and returns the oldest pending text, if any.
    pub fn drain_one(&self) -> Option<String> {
        self.queue.lock().items.pop_front()
    }

    /// Removes and returns everything pending, oldest first.
    pub fn drain_all(&self) -> Vec<String> {
        self.queue.lock().items.drain(..).collect()
    }

    /// Number of texts waiting for delivery.
    pub fn len(&self) -> usize {
        self.queue.lock().items.len()
    }

    /// Returns `true` if nothing is waiting for delivery.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().items.is_empty()
    }

    /// Waits until something is enqueued or the mailbox is closed.
    ///
    /// Single-consumer: only the owning connection should wait here.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    /// Closes the mailbox: discards pending text, rejects future enqueues
    /// and wakes the consumer. Returns how many texts were discarded.
    pub fn close(&self) -> usize {
        let discarded = {
            let mut queue = self.queue.lock();
            queue.closed = true;
            let n = queue.items.len();
            queue.items.clear();
            n
        };
        self.notify.notify_one();
        discarded
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_drain_one_returns_fifo_then_none() {
        let mailbox = Mailbox::new();
        mailbox.enqueue("a");
        mailbox.enqueue("b");
        mailbox.enqueue("c");

        assert_eq!(mailbox.drain_one().as_deref(), Some("a"));
        assert_eq!(mailbox.drain_one().as_deref(), Some("b"));
        assert_eq!(mailbox.drain_one().as_deref(), Some("c"));
        assert_eq!(mailbox.drain_one(), None);
    }

    #[test]
    fn test_drain_all_preserves_order_and_empties() {
        let mailbox = Mailbox::new();
        mailbox.enqueue("one");
        mailbox.enqueue("two");

        assert_eq!(mailbox.drain_all(), vec!["one", "two"]);
        assert!(mailbox.is_empty());
        assert!(mailbox.drain_all().is_empty());
    }

    #[test]
    fn test_enqueue_after_close_is_dropped() {
        let mailbox = Mailbox::new();
        mailbox.enqueue("pending");

        let discarded = mailbox.close();

        assert_eq!(discarded, 1);
        assert!(!mailbox.enqueue("late"));
        assert_eq!(mailbox.len(), 0);
        assert_eq!(mailbox.drain_one(), None);
    }

    #[test]
    fn test_concurrent_enqueue_keeps_per_producer_order() {
        let mailbox = Arc::new(Mailbox::new());
        std::thread::scope(|s| {
            for producer in 0..4 {
                let mailbox = Arc::clone(&mailbox);
                s.spawn(move || {
                    for i in 0..250 {
                        mailbox.enqueue(format!("{producer}:{i}"));
                    }
                });
            }
        });

        let all = mailbox.drain_all();
        assert_eq!(all.len(), 1000);
        for producer in 0..4 {
            let seen: Vec<usize> = all
                .iter()
                .filter_map(|t| t.strip_prefix(&format!("{producer}:")))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seen, (0..250).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_notified_wakes_on_enqueue_before_wait() {
        // The permit stored by notify_one must not be lost when the
        // consumer starts waiting after the producer enqueued.
        let mailbox = Mailbox::new();
        mailbox.enqueue("early");

        tokio::time::timeout(Duration::from_secs(1), mailbox.notified())
            .await
            .expect("should wake immediately");
        assert_eq!(mailbox.drain_one().as_deref(), Some("early"));
    }

    #[tokio::test]
    async fn test_notified_wakes_on_close() {
        let mailbox = Arc::new(Mailbox::new());
        let waiter = {
            let mailbox = Arc::clone(&mailbox);
            tokio::spawn(async move { mailbox.notified().await })
        };
        tokio::task::yield_now().await;

        mailbox.close();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("close should wake the consumer")
            .unwrap();
    }
}

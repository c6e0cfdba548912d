//! Bounded FIFO queues shared across pipeline stages.
//!
//! `BoundedQueue` is a thin contract over an MPMC channel: producers block
//! (or get `QueueFull` from the non-blocking variant) while the queue is at
//! capacity, consumers block until an item arrives or the queue is closed
//! and drained. Closing is idempotent and leaves outstanding items
//! consumable — close-then-drain is the normal end-of-stream sequence, not
//! a failure.
//!
//! Built on `async-channel` rather than `tokio::sync::mpsc`: its `Receiver`
//! is `Clone`, so N workers each hold their own dequeue handle with no
//! mutex serializing them.

use crate::types::{Error, Result};

/// Bounded FIFO container shared by reference between producers and
/// consumers. Cloning is cheap (channel handles only).
#[derive(Debug, Clone)]
pub struct BoundedQueue<T> {
    tx: async_channel::Sender<T>,
    rx: async_channel::Receiver<T>,
    name: &'static str,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (tx, rx) = async_channel::bounded(capacity);
        Self {
            tx,
            rx,
            name,
            capacity,
        }
    }

    /// Enqueue an item, waiting while the queue is at capacity.
    ///
    /// Returns `Closed` if the queue has been closed; the item is dropped
    /// without ever becoming visible to consumers.
    pub async fn enqueue(&self, item: T) -> Result<()> {
        self.tx
            .send(item)
            .await
            .map_err(|_| Error::closed(self.name))
    }

    /// Enqueue without blocking.
    ///
    /// Returns `QueueFull` when at capacity (retryable) and `Closed` when
    /// the queue no longer accepts items.
    pub fn try_enqueue(&self, item: T) -> Result<()> {
        self.tx.try_send(item).map_err(|e| match e {
            async_channel::TrySendError::Full(_) => {
                Error::queue_full(format!("{} at capacity {}", self.name, self.capacity))
            }
            async_channel::TrySendError::Closed(_) => Error::closed(self.name),
        })
    }

    /// Dequeue the next item, waiting while the queue is empty.
    ///
    /// `None` signals closed-and-drained — the normal end-of-stream
    /// condition, not an error.
    pub async fn dequeue(&self) -> Option<T> {
        self.rx.recv().await.ok()
    }

    /// Dequeue with a bounded wait.
    ///
    /// `Timeout` if no item arrives within `wait` (retryable);
    /// `Ok(None)` still signals closed-and-drained.
    pub async fn dequeue_timeout(&self, wait: std::time::Duration) -> Result<Option<T>> {
        tokio::time::timeout(wait, self.dequeue())
            .await
            .map_err(|_| Error::timeout(format!("{} dequeue after {:?}", self.name, wait)))
    }

    /// Mark the queue closed: no further enqueues are permitted, items
    /// already queued remain consumable. Idempotent.
    pub fn close(&self) {
        self.tx.close();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_fifo_order() {
        let q = BoundedQueue::new("test", 4);
        q.enqueue(1).await.unwrap();
        q.enqueue(2).await.unwrap();
        q.enqueue(3).await.unwrap();

        assert_eq!(q.dequeue().await, Some(1));
        assert_eq!(q.dequeue().await, Some(2));
        assert_eq!(q.dequeue().await, Some(3));
    }

    #[tokio::test]
    async fn test_try_enqueue_full() {
        let q = BoundedQueue::new("test", 2);
        assert_ok!(q.try_enqueue(1));
        assert_ok!(q.try_enqueue(2));

        let err = q.try_enqueue(3).unwrap_err();
        assert!(matches!(err, Error::QueueFull(_)));
        assert_eq!(q.len(), 2);

        // Space frees after a dequeue
        q.dequeue().await.unwrap();
        q.try_enqueue(3).unwrap();
    }

    #[tokio::test]
    async fn test_enqueue_blocks_until_space() {
        let q = BoundedQueue::new("test", 1);
        q.enqueue(1).await.unwrap();

        let q2 = q.clone();
        let producer = tokio::spawn(async move { q2.enqueue(2).await });

        // Blocked producer completes once the consumer makes room
        tokio::task::yield_now().await;
        assert!(!producer.is_finished());

        assert_eq!(q.dequeue().await, Some(1));
        producer.await.unwrap().unwrap();
        assert_eq!(q.dequeue().await, Some(2));
    }

    #[tokio::test]
    async fn test_close_drains_then_ends() {
        let q = BoundedQueue::new("test", 4);
        q.enqueue("a").await.unwrap();
        q.enqueue("b").await.unwrap();
        q.close();

        // Enqueue after close is rejected
        assert!(matches!(
            q.enqueue("c").await.unwrap_err(),
            Error::Closed(_)
        ));
        assert!(matches!(q.try_enqueue("c").unwrap_err(), Error::Closed(_)));

        // Outstanding items remain consumable, then end-of-stream
        assert_eq!(q.dequeue().await, Some("a"));
        assert_eq!(q.dequeue().await, Some("b"));
        assert_eq!(q.dequeue().await, None);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let q = BoundedQueue::<u8>::new("test", 1);
        q.close();
        q.close();
        assert!(q.is_closed());
    }

    #[tokio::test]
    async fn test_dequeue_unblocks_on_close() {
        let q = BoundedQueue::<u8>::new("test", 1);
        let q2 = q.clone();
        let consumer = tokio::spawn(async move { q2.dequeue().await });

        tokio::task::yield_now().await;
        q.close();

        assert_eq!(consumer.await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dequeue_timeout() {
        let q = BoundedQueue::<u8>::new("test", 2);

        let err = q
            .dequeue_timeout(std::time::Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
        assert!(err.is_retryable());

        q.enqueue(9).await.unwrap();
        let item = q
            .dequeue_timeout(std::time::Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(item, Some(9));

        // Closed-and-drained still reports end-of-stream, not timeout
        q.close();
        let item = q
            .dequeue_timeout(std::time::Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(item, None);
    }

    #[tokio::test]
    async fn test_len_never_exceeds_capacity() {
        let q = BoundedQueue::new("test", 3);
        for i in 0..3 {
            q.enqueue(i).await.unwrap();
        }
        assert_eq!(q.len(), q.capacity());
        assert!(q.try_enqueue(99).is_err());
    }
}

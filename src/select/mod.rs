//! Multi-source event selection.
//!
//! `EventSelector` is how a component reacts to "whichever event happens
//! first" without polling: it suspends on a set of labeled channel sources
//! plus an optional timeout and reports the one that fired. Sources that
//! close are pruned from the set.
//!
//! Tie-break when several sources are ready at once: the poll order rotates
//! by one slot per call, so under repeated use every ready source is
//! eventually chosen — no systematic starvation of any one label.

use futures::future::select_all;
use std::time::Duration;
use tokio::sync::mpsc;

/// Outcome of one [`EventSelector::select`] call.
#[derive(Debug, PartialEq, Eq)]
pub enum Selected<T> {
    /// A source produced a value.
    Event { label: String, value: T },
    /// The timeout elapsed before any source became ready. Recoverable; the
    /// caller decides whether to retry or abandon.
    TimedOut,
    /// Every source has closed; nothing will ever become ready again.
    Exhausted,
}

/// One labeled input source.
#[derive(Debug)]
struct Source<T> {
    label: String,
    rx: mpsc::Receiver<T>,
}

/// Waits on multiple labeled sources and reacts to whichever is ready first.
#[derive(Debug)]
pub struct EventSelector<T> {
    sources: Vec<Source<T>>,
    /// Rotating poll-order offset (fairness across calls).
    next: usize,
}

impl<T> Default for EventSelector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventSelector<T> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            next: 0,
        }
    }

    /// Register a labeled source.
    pub fn add_source(&mut self, label: impl Into<String>, rx: mpsc::Receiver<T>) {
        self.sources.push(Source {
            label: label.into(),
            rx,
        });
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Suspend until exactly one source is ready or the timeout elapses.
    ///
    /// With `timeout: None` the wait is unbounded — but still escapes when
    /// the last source closes, so no caller is ever stranded.
    pub async fn select(&mut self, timeout: Option<Duration>) -> Selected<T> {
        match timeout {
            Some(t) => match tokio::time::timeout(t, self.select_inner()).await {
                Ok(selected) => selected,
                Err(_) => Selected::TimedOut,
            },
            None => self.select_inner().await,
        }
    }

    async fn select_inner(&mut self) -> Selected<T> {
        loop {
            if self.sources.is_empty() {
                return Selected::Exhausted;
            }

            let offset = self.next % self.sources.len();

            // Poll order rotates by `offset`; select_all polls sequentially,
            // so the rotation is what keeps repeated ties fair.
            let mut futures: Vec<_> = self
                .sources
                .iter_mut()
                .enumerate()
                .map(|(i, s)| Box::pin(async move { (i, s.rx.recv().await) }))
                .collect();
            futures.rotate_left(offset);

            let ((index, received), _, _) = select_all(futures).await;

            match received {
                Some(value) => {
                    self.next = self.next.wrapping_add(1);
                    let label = self.sources[index].label.clone();
                    return Selected::Event { label, value };
                }
                None => {
                    // Source closed: prune and wait on the rest
                    self.sources.remove(index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_ready_source_wins() {
        let (tx_a, rx_a) = mpsc::channel(4);
        let (_tx_b, rx_b) = mpsc::channel::<&str>(4);

        let mut selector = EventSelector::new();
        selector.add_source("a", rx_a);
        selector.add_source("b", rx_b);

        tx_a.send("hello").await.unwrap();

        match selector.select(Some(Duration::from_secs(1))).await {
            Selected::Event { label, value } => {
                assert_eq!(label, "a");
                assert_eq!(value, "hello");
            }
            other => panic!("expected event from a, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_when_no_source_ready() {
        let (_tx, rx) = mpsc::channel::<u8>(1);
        let mut selector = EventSelector::new();
        selector.add_source("idle", rx);

        let selected = selector.select(Some(Duration::from_millis(50))).await;
        assert_eq!(selected, Selected::TimedOut);
    }

    #[tokio::test]
    async fn test_closed_sources_pruned_then_exhausted() {
        let (tx_a, rx_a) = mpsc::channel::<u8>(1);
        let (tx_b, rx_b) = mpsc::channel::<u8>(1);

        let mut selector = EventSelector::new();
        selector.add_source("a", rx_a);
        selector.add_source("b", rx_b);

        drop(tx_a);
        tx_b.send(7).await.unwrap();
        drop(tx_b);

        match selector.select(None).await {
            Selected::Event { label, value } => {
                assert_eq!(label, "b");
                assert_eq!(value, 7);
            }
            other => panic!("expected event from b, got {:?}", other),
        }
        assert_eq!(selector.len(), 1);

        assert_eq!(selector.select(None).await, Selected::Exhausted);
        assert!(selector.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_ties_rotate_across_sources() {
        let (tx_a, rx_a) = mpsc::channel(16);
        let (tx_b, rx_b) = mpsc::channel(16);

        let mut selector = EventSelector::new();
        selector.add_source("a", rx_a);
        selector.add_source("b", rx_b);

        // Both sources permanently ready
        for _ in 0..8 {
            tx_a.send("a").await.unwrap();
            tx_b.send("b").await.unwrap();
        }

        let mut seen_a = 0;
        let mut seen_b = 0;
        for _ in 0..8 {
            match selector.select(Some(Duration::from_secs(1))).await {
                Selected::Event { label, .. } if label == "a" => seen_a += 1,
                Selected::Event { .. } => seen_b += 1,
                other => panic!("unexpected {:?}", other),
            }
        }

        // Rotation must pick each repeatedly-ready source at least once
        assert!(seen_a > 0, "source a starved");
        assert!(seen_b > 0, "source b starved");
    }
}

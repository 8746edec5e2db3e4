use crossbeam::channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lock-free counters shared by every clone of a hub
#[derive(Debug, Default)]
struct AtomicHubMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
}

impl AtomicHubMetrics {
    fn snapshot(&self) -> HubMetrics {
        HubMetrics {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time hub counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
}

/// Named in-process topic
///
/// Every clone shares the same queue: one side publishes, the other drains.
/// Messages come out in the order they went in. The hub holds a receiver of
/// its own, so the queue outlives every subscriber and `send` cannot fail.
pub struct Hub<T> {
    topic_name: String,
    tx: Sender<T>,
    rx: Receiver<T>,
    metrics: Arc<AtomicHubMetrics>,
}

// Manual Clone implementation so T doesn't need to be Clone
impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            topic_name: self.topic_name.clone(),
            tx: self.tx.clone(),
            rx: self.rx.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("topic_name", &self.topic_name)
            .field("pending", &self.rx.len())
            .finish_non_exhaustive()
    }
}

impl<T> Hub<T> {
    /// Create a hub for `topic_name`
    pub fn new(topic_name: &str) -> Self {
        let (tx, rx) = unbounded();
        Self {
            topic_name: topic_name.to_string(),
            tx,
            rx,
            metrics: Arc::new(AtomicHubMetrics::default()),
        }
    }

    /// Publish a message
    pub fn send(&self, msg: T) {
        // Disconnection is impossible while `self.rx` is alive
        if self.tx.send(msg).is_ok() {
            self.metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Take the oldest pending message, if any
    pub fn recv(&self) -> Option<T> {
        let msg = self.rx.try_recv().ok()?;
        self.metrics.messages_received.fetch_add(1, Ordering::Relaxed);
        Some(msg)
    }

    /// Take every pending message, oldest first
    pub fn drain(&self) -> Vec<T> {
        let msgs: Vec<T> = self.rx.try_iter().collect();
        self.metrics
            .messages_received
            .fetch_add(msgs.len() as u64, Ordering::Relaxed);
        msgs
    }

    pub fn has_messages(&self) -> bool {
        !self.rx.is_empty()
    }

    pub fn topic(&self) -> &str {
        &self.topic_name
    }

    pub fn metrics(&self) -> HubMetrics {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_queue() {
        let publisher: Hub<u32> = Hub::new("actuation");
        let subscriber = publisher.clone();

        publisher.send(1);
        publisher.send(2);

        assert!(subscriber.has_messages());
        assert_eq!(subscriber.recv(), Some(1));
        assert_eq!(subscriber.drain(), vec![2]);
        assert_eq!(subscriber.recv(), None);
    }

    #[test]
    fn test_metrics_count_both_directions() {
        let hub: Hub<&str> = Hub::new("ui");
        hub.send("a");
        hub.send("b");
        hub.send("c");
        let _ = hub.recv();
        let _ = hub.drain();

        let metrics = hub.metrics();
        assert_eq!(metrics.messages_sent, 3);
        assert_eq!(metrics.messages_received, 3);
    }

    #[test]
    fn test_drain_preserves_publication_order() {
        let hub = Hub::new("ordering");
        for i in 0..50 {
            hub.send(i);
        }
        assert_eq!(hub.drain(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_topic_name() {
        let hub: Hub<()> = Hub::new("actuation");
        assert_eq!(hub.topic(), "actuation");
    }
}

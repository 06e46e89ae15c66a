use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::tracker::TrackerRecord;

// If a subscriber falls this far behind it skips intermediate records and
// resumes at a newer one; only the latest state matters to observers.
const CHANNEL_CAPACITY: usize = 64;

/// Fan-out point for record changes. Each WebSocket client holds a
/// `Subscription`; publishing never blocks and never waits on a slow
/// subscriber, since every receiver has its own bounded queue.
#[derive(Clone)]
pub struct BroadcastHub {
    tx: broadcast::Sender<TrackerRecord>,
    connected: Arc<AtomicUsize>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            connected: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Send `record` to every current subscriber. A hub with no subscribers
    /// is not an error; the record is simply dropped.
    pub fn publish(&self, record: TrackerRecord) {
        let _ = self.tx.send(record);
    }

    /// Register a new subscriber. Deregistration happens when the returned
    /// `Subscription` is dropped, so a vanished client cleans itself up.
    pub fn join(&self) -> Subscription {
        self.connected.fetch_add(1, Ordering::Relaxed);
        Subscription {
            rx: self.tx.subscribe(),
            connected: Arc::clone(&self.connected),
        }
    }

    pub fn connected_clients(&self) -> usize {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Subscription {
    rx: broadcast::Receiver<TrackerRecord>,
    connected: Arc<AtomicUsize>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Result<TrackerRecord, broadcast::error::RecvError> {
        self.rx.recv().await
    }

    /// Discard everything currently queued. Records queued before a
    /// join-time snapshot read predate the snapshot and are already
    /// reflected in it; relaying them would reorder or duplicate state.
    pub fn drain_backlog(&mut self) {
        use broadcast::error::TryRecvError;
        loop {
            match self.rx.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    #[cfg(test)]
    pub fn try_recv(&mut self) -> Result<TrackerRecord, broadcast::error::TryRecvError> {
        self.rx.try_recv()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.connected.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{TrackerRecord, TrackerStatus};
    use tokio::sync::broadcast::error::TryRecvError;

    fn record() -> TrackerRecord {
        let mut record = TrackerRecord::initial("Train-102".into(), 23.81, 90.41);
        record.status = TrackerStatus::Live;
        record
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber_exactly_once() {
        let hub = BroadcastHub::new();
        let mut subs = [hub.join(), hub.join(), hub.join()];

        hub.publish(record());

        for sub in &mut subs {
            assert_eq!(sub.try_recv().unwrap(), record());
            assert_eq!(sub.try_recv(), Err(TryRecvError::Empty));
        }
    }

    #[tokio::test]
    async fn late_joiner_sees_nothing_from_earlier_publishes() {
        let hub = BroadcastHub::new();
        let mut early = hub.join();

        hub.publish(record());
        let mut late = hub.join();

        assert!(early.try_recv().is_ok());
        assert_eq!(late.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let hub = BroadcastHub::new();
        hub.publish(record());
        assert_eq!(hub.connected_clients(), 0);
    }

    #[tokio::test]
    async fn connected_count_tracks_joins_and_drops() {
        let hub = BroadcastHub::new();
        assert_eq!(hub.connected_clients(), 0);

        let a = hub.join();
        let b = hub.join();
        assert_eq!(hub.connected_clients(), 2);

        drop(a);
        assert_eq!(hub.connected_clients(), 1);
        drop(b);
        assert_eq!(hub.connected_clients(), 0);
    }

    #[tokio::test]
    async fn drained_subscriber_only_sees_later_publishes() {
        let hub = BroadcastHub::new();
        let mut sub = hub.join();

        let mut first = record();
        first.latitude = 1.0;
        let mut second = record();
        second.latitude = 2.0;
        hub.publish(first);
        hub.publish(second);

        sub.drain_backlog();
        assert_eq!(sub.try_recv(), Err(TryRecvError::Empty));

        let mut third = record();
        third.latitude = 3.0;
        hub.publish(third.clone());
        assert_eq!(sub.try_recv().unwrap(), third);
        assert_eq!(sub.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn dropped_subscriber_does_not_affect_the_rest() {
        let hub = BroadcastHub::new();
        let gone = hub.join();
        let mut kept = hub.join();

        drop(gone);
        hub.publish(record());

        assert_eq!(kept.try_recv().unwrap(), record());
    }
}

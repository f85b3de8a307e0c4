use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::trace;

/// State that evolves only by applying events, one at a time.
pub trait Reducer: Clone + Send + Sync + 'static {
    type Event: Send + 'static;

    fn apply(&mut self, event: Self::Event);
}

/// Owns a state value on a dedicated task.
///
/// Writers send events over an mpsc channel; the task applies them in arrival
/// order and publishes every resulting snapshot on a watch channel, so there is
/// exactly one writer no matter how many producers exist. Dropping the actor
/// stops the task.
pub struct StateActor<R: Reducer> {
    events: mpsc::UnboundedSender<R::Event>,
    snapshots: watch::Receiver<R>,
    task: JoinHandle<()>,
}

impl<R: Reducer> StateActor<R> {
    /// Must be called from within a Tokio runtime
    pub fn spawn(initial: R) -> Self {
        let (events, mut rx) = mpsc::unbounded_channel::<R::Event>();
        let (publisher, snapshots) = watch::channel(initial);

        let task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                publisher.send_modify(|state| state.apply(event));
            }
            trace!("State actor channel closed");
        });

        Self { events, snapshots, task }
    }

    /// Queue an event. Returns false once the actor has stopped.
    pub fn send(&self, event: R::Event) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<R::Event> {
        self.events.clone()
    }

    pub fn snapshot(&self) -> R {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<R> {
        self.snapshots.clone()
    }

    /// Resolve with the first snapshot (current one included) satisfying `pred`.
    /// `None` if the actor stops first.
    pub async fn wait_for(&self, pred: impl FnMut(&R) -> bool) -> Option<R> {
        let mut rx = self.snapshots.clone();
        let state = rx.wait_for(pred).await.ok()?;
        Some(state.clone())
    }
}

impl<R: Reducer> Drop for StateActor<R> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Tally {
        seen: Vec<u32>,
    }

    impl Reducer for Tally {
        type Event = u32;

        fn apply(&mut self, event: u32) {
            self.seen.push(event);
        }
    }

    #[tokio::test]
    async fn test_events_applied_in_order() {
        let actor = StateActor::spawn(Tally::default());
        for n in 0..50 {
            assert!(actor.send(n));
        }
        let state = actor.wait_for(|t| t.seen.len() == 50).await.unwrap();
        assert_eq!(state.seen, (0..50).collect::<Vec<_>>());
        assert_eq!(actor.snapshot(), state);
    }

    #[tokio::test]
    async fn test_concurrent_producers_single_writer() {
        let actor = StateActor::spawn(Tally::default());
        let mut handles = Vec::new();
        for worker in 0..4u32 {
            let tx = actor.sender();
            handles.push(tokio::spawn(async move {
                for n in 0..25 {
                    tx.send(worker * 100 + n).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let state = tokio::time::timeout(Duration::from_secs(5), actor.wait_for(|t| t.seen.len() == 100))
            .await
            .unwrap()
            .unwrap();
        for worker in 0..4u32 {
            let own: Vec<u32> = state.seen.iter().copied().filter(|n| n / 100 == worker).collect();
            assert_eq!(own, (0..25).map(|n| worker * 100 + n).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_subscriber_sees_changes() {
        let actor = StateActor::spawn(Tally::default());
        let mut rx = actor.subscribe();
        actor.send(7);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().seen, vec![7]);
    }
}

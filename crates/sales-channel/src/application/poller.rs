//! Periodic reconciliation of one channel.

use std::sync::Arc;
use std::time::Duration;

use channel_telemetry::log_event;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::application::reconciler::StateReconciler;
use crate::domain::{Address, ChannelError, ChannelId, Reconciliation};

/// Latest poll outcome; `None` until the first poll completes.
pub type PollUpdate = Option<Result<Reconciliation, ChannelError>>;

/// Background poller. Stops when dropped.
pub struct ChannelPoller {
    handle: JoinHandle<()>,
    updates: watch::Receiver<PollUpdate>,
}

impl ChannelPoller {
    /// Reconcile `channel_id` for `address` now and then every `interval`.
    ///
    /// Failures are logged and published; polling continues.
    pub fn spawn(
        reconciler: Arc<StateReconciler>,
        channel_id: ChannelId,
        address: Address,
        interval: Duration,
    ) -> Self {
        let (tx, updates) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let result = reconciler.reconcile(&channel_id, &address).await;
                if let Err(error) = &result {
                    log_event!(warn, "poller", "Poll failed, will retry",
                        channel_id = %channel_id, error = %error);
                }
                tx.send_replace(Some(result));
            }
        });

        Self { handle, updates }
    }

    /// New receiver of poll outcomes.
    pub fn subscribe(&self) -> watch::Receiver<PollUpdate> {
        self.updates.clone()
    }

    /// Most recent outcome.
    pub fn latest(&self) -> PollUpdate {
        self.updates.borrow().clone()
    }

    /// Stop polling.
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ChannelPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryStore, MockLedger};
    use crate::application::cache::ChannelCache;
    use crate::domain::{Channel, Role};
    use crate::ports::MockTimeSource;

    fn reconciler(ledger: MockLedger) -> Arc<StateReconciler> {
        let cache = ChannelCache::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(MockTimeSource::new(0)),
        );
        Arc::new(StateReconciler::new(Arc::new(ledger), cache))
    }

    #[tokio::test]
    async fn test_publishes_updates_and_picks_up_changes() {
        let ledger = MockLedger::new().with_channel(Channel {
            id: "c1".into(),
            owner: "DAG_OWNER".into(),
            ..Default::default()
        });
        let poller = ChannelPoller::spawn(
            reconciler(ledger.clone()),
            "c1".into(),
            "DAG1".into(),
            Duration::from_millis(10),
        );
        let mut updates = poller.subscribe();

        updates.changed().await.unwrap();
        let first = updates.borrow_and_update().clone().unwrap().unwrap();
        assert_eq!(first.role, Role::NotAMember);

        ledger.put_channel(Channel {
            id: "c1".into(),
            owner: "DAG_OWNER".into(),
            sellers: vec!["DAG1".into()],
            ..Default::default()
        });

        loop {
            updates.changed().await.unwrap();
            let latest = updates.borrow_and_update().clone().unwrap().unwrap();
            if latest.role == Role::Seller {
                break;
            }
        }
        poller.stop();
    }

    #[tokio::test]
    async fn test_keeps_polling_after_errors() {
        let ledger = MockLedger::new();
        let poller = ChannelPoller::spawn(
            reconciler(ledger.clone()),
            "missing".into(),
            "DAG1".into(),
            Duration::from_millis(5),
        );
        let mut updates = poller.subscribe();

        for _ in 0..3 {
            updates.changed().await.unwrap();
        }
        assert!(matches!(
            poller.latest(),
            Some(Err(ChannelError::NotFound(_)))
        ));
        assert!(ledger.fetch_count() >= 3);
        assert!(poller.is_running());
    }
}

//! # Sales Channel Service
//!
//! Application service composing identity, builder, queue and reconciler
//! behind [`SalesChannelApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use channel_telemetry::log_event;
use tracing::instrument;

use crate::algorithms::{sales_per_seller, SalesSeries};
use crate::application::builder::TransactionBuilder;
use crate::application::cache::ChannelCache;
use crate::application::identity::IdentityProvider;
use crate::application::poller::ChannelPoller;
use crate::application::queue::SubmissionQueue;
use crate::application::reconciler::StateReconciler;
use crate::application::session::SessionStore;
use crate::config::ChannelConfig;
use crate::domain::{
    Address, BatchOutcome, BuildContext, ChannelError, ChannelId, Command, CommandDraft,
    Identity, InventoryInput, ProductInput, Reconciliation, SaleLine, TxHash,
};
use crate::ports::{KeyValueStore, Keystore, LedgerGateway, SalesChannelApi, TimeSource};

/// Sales Channel Service - the client-side transaction pipeline.
pub struct SalesChannelService {
    /// Configuration.
    config: ChannelConfig,
    /// Local wallet identity.
    identity: Arc<IdentityProvider>,
    /// Draft validation.
    builder: TransactionBuilder,
    /// Ordered ledger writes.
    queue: SubmissionQueue,
    /// Snapshot reads.
    reconciler: Arc<StateReconciler>,
    /// Active channel and onboarding state.
    session: SessionStore,
    clock: Arc<dyn TimeSource>,
}

impl SalesChannelService {
    /// Wire a service over the given adapters. Fails on invalid configuration.
    pub fn new(
        config: ChannelConfig,
        keystore: Arc<dyn Keystore>,
        ledger: Arc<dyn LedgerGateway>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ChannelError> {
        config.validate()?;

        let identity = Arc::new(IdentityProvider::new(keystore));
        let cache = ChannelCache::new(store.clone(), clock.clone());

        Ok(Self {
            builder: TransactionBuilder::from_config(&config),
            queue: SubmissionQueue::new(identity.clone(), ledger.clone()),
            reconciler: Arc::new(StateReconciler::new(ledger, cache)),
            session: SessionStore::new(store),
            identity,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn queue(&self) -> &SubmissionQueue {
        &self.queue
    }

    pub fn reconciler(&self) -> &Arc<StateReconciler> {
        &self.reconciler
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn identity_provider(&self) -> &Arc<IdentityProvider> {
        &self.identity
    }

    /// Internal: context for commands that act on the active channel.
    async fn active_context(&self) -> Result<BuildContext, ChannelError> {
        let identity = self.identity.ensure_identity().await?;
        let context = self
            .session
            .build_context(&identity, self.clock.as_ref())
            .await?;
        if context.channel_id.is_none() {
            return Err(ChannelError::NoActiveChannel);
        }
        Ok(context)
    }

    /// Internal: submit one command and wait for its hash.
    async fn submit_one(&self, command: Command) -> Result<TxHash, ChannelError> {
        let record = self.queue.submit(command).await?;
        record.outcome().cloned()
    }

    /// Internal: build every draft before anything is enqueued.
    fn build_all(
        &self,
        drafts: Vec<CommandDraft>,
        context: &BuildContext,
    ) -> Result<Vec<Command>, ChannelError> {
        drafts
            .into_iter()
            .map(|draft| self.builder.build(draft, context))
            .collect()
    }

    /// Per-minute sales of each seller on the active channel.
    pub async fn sales_analytics(&self) -> Result<Vec<SalesSeries>, ChannelError> {
        let reconciliation = self.reconcile_active().await?;
        Ok(sales_per_seller(
            &reconciliation.channel,
            self.clock.now(),
            self.config.analytics_window_minutes,
        ))
    }

    /// Start polling the active channel at the configured interval.
    pub async fn watch(&self) -> Result<ChannelPoller, ChannelError> {
        let identity = self.identity.ensure_identity().await?;
        let channel_id = self
            .session
            .active_channel()
            .await?
            .ok_or(ChannelError::NoActiveChannel)?;

        Ok(ChannelPoller::spawn(
            self.reconciler.clone(),
            channel_id,
            identity.address,
            Duration::from_secs(self.config.poll_interval_secs),
        ))
    }
}

#[async_trait]
impl SalesChannelApi for SalesChannelService {
    async fn identity(&self) -> Result<Identity, ChannelError> {
        self.identity.ensure_identity().await
    }

    #[instrument(skip(self, products), fields(products = products.len()))]
    async fn create_channel(
        &self,
        name: &str,
        products: Vec<ProductInput>,
    ) -> Result<ChannelId, ChannelError> {
        let identity = self.identity.ensure_identity().await?;
        let context = self
            .session
            .build_context(&identity, self.clock.as_ref())
            .await?;
        let command = self.builder.build(
            CommandDraft::CreateSalesChannel {
                name: name.to_string(),
                products,
            },
            &context,
        )?;

        let channel_id = self.submit_one(command).await?;
        self.session.set_active_channel(&channel_id).await?;
        log_event!(info, "service", "Channel created",
            channel_id = %channel_id, owner = %identity.address);
        Ok(channel_id)
    }

    async fn add_inventory(
        &self,
        items: Vec<InventoryInput>,
    ) -> Result<BatchOutcome, ChannelError> {
        if items.is_empty() {
            return Err(ChannelError::invalid("product", "no inventory lines"));
        }
        let context = self.active_context().await?;
        let drafts = items
            .into_iter()
            .map(|item| CommandDraft::AddInventory {
                product: item.product,
                amount: item.amount,
            })
            .collect();
        let commands = self.build_all(drafts, &context)?;
        Ok(self.queue.submit_batch(commands).await)
    }

    async fn move_inventory(
        &self,
        to_address: &str,
        product: &str,
        amount: &str,
    ) -> Result<TxHash, ChannelError> {
        let context = self.active_context().await?;
        let command = self.builder.build(
            CommandDraft::MoveInventory {
                to_address: to_address.to_string(),
                product: product.to_string(),
                amount: amount.to_string(),
            },
            &context,
        )?;
        self.submit_one(command).await
    }

    #[instrument(skip(self, sellers), fields(sellers = sellers.len()))]
    async fn add_sellers(&self, sellers: Vec<String>) -> Result<BatchOutcome, ChannelError> {
        if sellers.is_empty() {
            return Err(ChannelError::invalid("seller", "no sellers given"));
        }
        let context = self.active_context().await?;
        let drafts = sellers
            .into_iter()
            .map(|seller| CommandDraft::AddSeller { seller })
            .collect();
        let commands = self.build_all(drafts, &context)?;
        let outcome = self.queue.submit_batch(commands).await;

        let mut roster = self.session.last_known_sellers().await?;
        for record in &outcome.confirmed {
            if let Command::AddSeller(add) = &record.command {
                if !roster.contains(&add.seller) {
                    roster.push(add.seller.clone());
                }
            }
        }
        self.session.set_last_known_sellers(&roster).await?;

        if outcome.all_confirmed() {
            self.session.mark_onboarded().await?;
        } else {
            log_event!(warn, "service", "Some sellers were not added",
                confirmed = outcome.confirmed.len(), failed = outcome.failed.len());
        }
        Ok(outcome)
    }

    async fn add_products(&self, products: Vec<ProductInput>) -> Result<TxHash, ChannelError> {
        let context = self.active_context().await?;
        let command = self
            .builder
            .build(CommandDraft::AddProducts { products }, &context)?;
        self.submit_one(command).await
    }

    async fn record_sale(
        &self,
        lines: Vec<SaleLine>,
        payment: &str,
        station: Option<String>,
    ) -> Result<TxHash, ChannelError> {
        let context = self.active_context().await?;
        let command = self.builder.build(
            CommandDraft::Sale {
                lines,
                payment: payment.to_string(),
                station,
            },
            &context,
        )?;
        self.submit_one(command).await
    }

    async fn reconcile(&self, channel_id: &str) -> Result<Reconciliation, ChannelError> {
        let identity = self.identity.ensure_identity().await?;
        self.reconciler.reconcile(channel_id, &identity.address).await
    }

    async fn reconcile_active(&self) -> Result<Reconciliation, ChannelError> {
        let channel_id = self
            .session
            .active_channel()
            .await?
            .ok_or(ChannelError::NoActiveChannel)?;
        self.reconcile(&channel_id).await
    }

    #[instrument(skip(self))]
    async fn join_channel(&self, channel_id: &str) -> Result<Reconciliation, ChannelError> {
        let identity = self.identity.ensure_identity().await?;
        let reconciliation = self.reconciler.reconcile(channel_id, &identity.address).await?;
        if !reconciliation.role.is_member() {
            return Err(ChannelError::MembershipRequired {
                channel_id: channel_id.to_string(),
                address: identity.address,
            });
        }

        let sellers: Vec<Address> = reconciliation.channel.sellers.clone();
        self.session.set_active_channel(channel_id).await?;
        self.session.set_last_known_sellers(&sellers).await?;
        self.session.mark_onboarded().await?;

        log_event!(info, "service", "Joined channel",
            channel_id = %channel_id, role = reconciliation.role.as_str());
        Ok(reconciliation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryStore, MockLedger, Secp256k1Keystore};
    use crate::domain::{Channel, Role, SubmissionState};
    use crate::ports::MockTimeSource;

    struct Harness {
        service: SalesChannelService,
        ledger: MockLedger,
        store: Arc<InMemoryStore>,
        clock: Arc<MockTimeSource>,
    }

    fn harness(ledger: MockLedger) -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(MockTimeSource::new(1_700_000_000_000));
        let service = SalesChannelService::new(
            ChannelConfig::for_testing(),
            Arc::new(Secp256k1Keystore::new(store.clone())),
            Arc::new(ledger.clone()),
            store.clone(),
            clock.clone(),
        )
        .unwrap();
        Harness {
            service,
            ledger,
            store,
            clock,
        }
    }

    async fn with_channel(h: &Harness) -> ChannelId {
        h.service
            .create_channel("Market", vec![ProductInput::new("tea", "2.5")])
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let config = ChannelConfig {
            poll_interval_secs: 0,
            ..ChannelConfig::for_testing()
        };
        let store = Arc::new(InMemoryStore::new());
        let result = SalesChannelService::new(
            config,
            Arc::new(Secp256k1Keystore::new(store.clone())),
            Arc::new(MockLedger::new()),
            store,
            Arc::new(MockTimeSource::new(0)),
        );
        assert!(matches!(result, Err(ChannelError::Config(_))));
    }

    #[tokio::test]
    async fn test_create_channel_sets_active_and_owner_is_signer() {
        let h = harness(MockLedger::new());
        let channel_id = with_channel(&h).await;

        assert_eq!(
            h.service.session().active_channel().await.unwrap(),
            Some(channel_id.clone())
        );

        let reconciled = h.service.reconcile_active().await.unwrap();
        let me = h.service.identity().await.unwrap();
        assert_eq!(reconciled.role, Role::Owner);
        assert_eq!(reconciled.channel.owner, me.address);
        assert_eq!(reconciled.channel.products.get("tea"), Some(&2.5));
    }

    #[tokio::test]
    async fn test_commands_without_active_channel() {
        let h = harness(MockLedger::new());
        let err = h
            .service
            .add_products(vec![ProductInput::new("tea", "1")])
            .await
            .unwrap_err();
        assert_eq!(err, ChannelError::NoActiveChannel);
        assert_eq!(
            h.service.reconcile_active().await.unwrap_err(),
            ChannelError::NoActiveChannel
        );
        assert!(h.ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_empty_amount_never_reaches_ledger() {
        let h = harness(MockLedger::new());
        with_channel(&h).await;
        let before = h.ledger.submissions().len();

        let err = h
            .service
            .add_inventory(vec![
                InventoryInput::new("tea", "5"),
                InventoryInput::new("tea", ""),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, ChannelError::InvalidCommand { field: "amount", .. }));
        assert_eq!(h.ledger.submissions().len(), before);
    }

    #[tokio::test]
    async fn test_inventory_move_and_sale() {
        let h = harness(MockLedger::new());
        let channel_id = with_channel(&h).await;
        let seller = dag_crypto::DagKeyPair::generate().address();

        let stocked = h
            .service
            .add_inventory(vec![InventoryInput::new("tea", "10")])
            .await
            .unwrap();
        assert!(stocked.all_confirmed());

        h.service.add_sellers(vec![seller.clone()]).await.unwrap();
        h.service.move_inventory(&seller, "tea", "4").await.unwrap();
        h.clock.advance(1_000);
        h.service
            .record_sale(vec![SaleLine::new("tea", 2)], "cash", Some("stall 1".into()))
            .await
            .unwrap();

        let me = h.service.identity().await.unwrap().address;
        let channel = h.ledger.channel(&channel_id).unwrap();
        assert_eq!(channel.stock_of(&me, "tea"), 6.0);
        assert_eq!(channel.stock_of(&seller, "tea"), 4.0);
        assert_eq!(channel.sales.len(), 1);
    }

    #[tokio::test]
    async fn test_move_beyond_stock_is_rejected() {
        let h = harness(MockLedger::new());
        with_channel(&h).await;
        let seller = dag_crypto::DagKeyPair::generate().address();
        h.service.add_sellers(vec![seller.clone()]).await.unwrap();

        let err = h
            .service
            .move_inventory(&seller, "tea", "3")
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::RejectedByLedger { .. }));
    }

    #[tokio::test]
    async fn test_add_sellers_partial_failure() {
        let bad = dag_crypto::DagKeyPair::generate().address();
        let good = dag_crypto::DagKeyPair::generate().address();
        let rejected = bad.clone();
        let ledger = MockLedger::new().failing_when(move |command| match command {
            Command::AddSeller(add) if add.seller == rejected => {
                Some(ChannelError::NetworkError("timeout".into()))
            }
            _ => None,
        });
        let h = harness(ledger);
        with_channel(&h).await;

        let outcome = h
            .service
            .add_sellers(vec![bad.clone(), good.clone()])
            .await
            .unwrap();

        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.confirmed.len(), 1);
        assert_eq!(outcome.failed[0].state, SubmissionState::Failed);
        assert_eq!(h.service.session().last_known_sellers().await.unwrap(), vec![good.clone()]);
        assert!(!h.service.session().is_onboarded().await.unwrap());

        let retried = h.service.queue().retry(&outcome.failed[0]).wait().await.unwrap();
        assert_eq!(retried.attempt_count, 2);
    }

    #[tokio::test]
    async fn test_add_sellers_marks_onboarded() {
        let h = harness(MockLedger::new());
        with_channel(&h).await;
        let seller = dag_crypto::DagKeyPair::generate().address();

        let outcome = h.service.add_sellers(vec![seller.clone()]).await.unwrap();
        assert!(outcome.all_confirmed());
        assert!(h.service.session().is_onboarded().await.unwrap());
        assert_eq!(h.service.session().last_known_sellers().await.unwrap(), vec![seller]);
    }

    #[tokio::test]
    async fn test_join_requires_membership() {
        let h = harness(MockLedger::new());
        let ledger = h.ledger.clone();
        ledger.put_channel(Channel {
            id: "foreign".into(),
            owner: "DAG_SOMEONE".into(),
            sellers: vec!["DAG_SOMEONE".into()],
            ..Default::default()
        });

        let err = h.service.join_channel("foreign").await.unwrap_err();
        assert!(matches!(err, ChannelError::MembershipRequired { .. }));
        assert_eq!(h.service.session().active_channel().await.unwrap(), None);
        assert_eq!(h.store.len(), 1, "only the wallet key is stored");

        let me = h.service.identity().await.unwrap().address;
        ledger.put_channel(Channel {
            id: "foreign".into(),
            owner: "DAG_SOMEONE".into(),
            sellers: vec!["DAG_SOMEONE".into(), me],
            ..Default::default()
        });

        let joined = h.service.join_channel("foreign").await.unwrap();
        assert_eq!(joined.role, Role::Seller);
        assert_eq!(
            h.service.session().active_channel().await.unwrap().as_deref(),
            Some("foreign")
        );
        assert!(h.service.session().is_onboarded().await.unwrap());
    }

    #[tokio::test]
    async fn test_sales_analytics_buckets_recent_sales() {
        let h = harness(MockLedger::new());
        with_channel(&h).await;
        h.service
            .add_inventory(vec![InventoryInput::new("tea", "10")])
            .await
            .unwrap();
        h.service
            .record_sale(vec![SaleLine::new("tea", 3)], "card", None)
            .await
            .unwrap();

        let series = h.service.sales_analytics().await.unwrap();
        let me = h.service.identity().await.unwrap().address;
        let mine = series.iter().find(|s| s.seller == me).unwrap();
        assert_eq!(mine.total(), 3);
        assert_eq!(mine.per_minute.len(), h.service.config().analytics_window_minutes);
    }
}

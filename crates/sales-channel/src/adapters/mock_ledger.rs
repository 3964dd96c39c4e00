//! # Mock Ledger
//!
//! In-process [`LedgerGateway`] that verifies proofs and applies commands to
//! simulated channel state. Used by unit and integration tests.
//!
//! Also records submission order and the peak number of concurrent
//! submissions, so queue ordering can be asserted directly.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::algorithms::{canonical_bytes, verify_proof};
use crate::domain::{Channel, ChannelError, ChannelSnapshot, Command, Proof, TxHash};
use crate::ports::LedgerGateway;

/// Failure injection hook: return `Some(error)` to fail a submission.
pub type FailurePredicate = Arc<dyn Fn(&Command) -> Option<ChannelError> + Send + Sync>;

#[derive(Default)]
struct MockState {
    channels: BTreeMap<String, Channel>,
    submissions: Vec<Command>,
    in_flight: usize,
    max_in_flight: usize,
    fetches: usize,
}

/// Mock ledger for testing.
#[derive(Clone, Default)]
pub struct MockLedger {
    state: Arc<Mutex<MockState>>,
    latency: Option<Duration>,
    fail_when: Option<FailurePredicate>,
    fail_fetch: Option<ChannelError>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing channel.
    pub fn with_channel(self, channel: Channel) -> Self {
        self.state
            .lock()
            .channels
            .insert(channel.id.clone(), channel);
        self
    }

    /// Delay every submission by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail submissions matching `predicate`.
    pub fn failing_when(
        mut self,
        predicate: impl Fn(&Command) -> Option<ChannelError> + Send + Sync + 'static,
    ) -> Self {
        self.fail_when = Some(Arc::new(predicate));
        self
    }

    /// Fail every snapshot fetch with `error`.
    pub fn failing_fetch(mut self, error: ChannelError) -> Self {
        self.fail_fetch = Some(error);
        self
    }

    /// Commands in the order they reached the ledger (accepted or not).
    pub fn submissions(&self) -> Vec<Command> {
        self.state.lock().submissions.clone()
    }

    /// Peak number of overlapping `submit` calls.
    pub fn max_concurrency(&self) -> usize {
        self.state.lock().max_in_flight
    }

    /// Number of `fetch_channel` calls served.
    pub fn fetch_count(&self) -> usize {
        self.state.lock().fetches
    }

    /// Current simulated state of a channel.
    pub fn channel(&self, id: &str) -> Option<Channel> {
        self.state.lock().channels.get(id).cloned()
    }

    /// Overwrite a channel's state directly.
    pub fn put_channel(&self, channel: Channel) {
        self.state
            .lock()
            .channels
            .insert(channel.id.clone(), channel);
    }

    fn accept(&self, command: &Command, proof: &Proof) -> Result<TxHash, ChannelError> {
        if let Some(error) = self.fail_when.as_ref().and_then(|f| f(command)) {
            return Err(error);
        }
        verify_proof(command, proof).map_err(|e| rejected(format!("invalid proof: {e}")))?;

        let hash = Self::hash_of(command, proof)?;
        apply(&mut self.state.lock().channels, command, &hash)?;
        Ok(hash)
    }

    fn hash_of(command: &Command, proof: &Proof) -> Result<TxHash, ChannelError> {
        let mut hasher = Sha256::new();
        hasher.update(canonical_bytes(command)?);
        hasher.update(proof.signature.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

fn rejected(reason: impl Into<String>) -> ChannelError {
    ChannelError::RejectedByLedger {
        status: 400,
        body: reason.into(),
    }
}

fn apply(
    channels: &mut BTreeMap<String, Channel>,
    command: &Command,
    hash: &str,
) -> Result<(), ChannelError> {
    if let Command::CreateSalesChannel(create) = command {
        channels.insert(
            hash.to_string(),
            Channel {
                id: hash.to_string(),
                name: create.name.clone(),
                owner: create.owner.clone(),
                products: create
                    .products
                    .iter()
                    .map(|(name, price)| (name.clone(), price.value()))
                    .collect(),
                sellers: vec![create.owner.clone()],
                ..Default::default()
            },
        );
        return Ok(());
    }

    let channel_id = command.channel_id().unwrap_or_default();
    let channel = channels
        .get_mut(channel_id)
        .ok_or_else(|| rejected(format!("unknown channel {channel_id}")))?;
    if !channel.role_of(command.actor()).is_member() {
        return Err(rejected(format!("{} is not a member", command.actor())));
    }

    match command {
        Command::CreateSalesChannel(_) => {}
        Command::AddInventory(add) => {
            *channel
                .inventory
                .entry(add.address.clone())
                .or_default()
                .entry(add.product.clone())
                .or_default() += add.amount.value();
        }
        Command::MoveInventory(mv) => {
            let available = channel.stock_of(&mv.address, &mv.product);
            if available < mv.amount.value() {
                return Err(rejected(format!(
                    "insufficient {}: {available} < {}",
                    mv.product, mv.amount
                )));
            }
            *channel
                .inventory
                .entry(mv.address.clone())
                .or_default()
                .entry(mv.product.clone())
                .or_default() -= mv.amount.value();
            *channel
                .inventory
                .entry(mv.to_address.clone())
                .or_default()
                .entry(mv.product.clone())
                .or_default() += mv.amount.value();
        }
        Command::AddSeller(add) => {
            if !channel.sellers.contains(&add.seller) {
                channel.sellers.push(add.seller.clone());
            }
        }
        Command::AddProducts(add) => {
            for (name, price) in &add.products {
                channel.products.insert(name.clone(), price.value());
            }
        }
        Command::Sale(sale) => {
            let lines = channel
                .sales
                .entry(sale.timestamp)
                .or_default()
                .entry(sale.address.clone())
                .or_default();
            for (product, count) in &sale.sale {
                *lines.entry(product.clone()).or_default() += count;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl LedgerGateway for MockLedger {
    async fn submit(&self, command: &Command, proof: &Proof) -> Result<TxHash, ChannelError> {
        {
            let mut state = self.state.lock();
            state.submissions.push(command.clone());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let result = self.accept(command, proof);
        self.state.lock().in_flight -= 1;
        result
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelSnapshot, ChannelError> {
        let mut state = self.state.lock();
        state.fetches += 1;
        if let Some(error) = &self.fail_fetch {
            return Err(error.clone());
        }
        state
            .channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| ChannelError::NotFound(channel_id.to_string()))
    }
}

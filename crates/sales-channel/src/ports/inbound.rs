//! # Inbound Ports
//!
//! API trait defining what a sales-channel client can do.

use crate::domain::{
    BatchOutcome, ChannelError, ChannelId, Identity, InventoryInput, ProductInput,
    Reconciliation, SaleLine, TxHash,
};
use async_trait::async_trait;

/// Sales channel API - inbound port.
///
/// Every write goes through the submission queue; methods returning a single
/// [`TxHash`] wait for that submission's terminal state.
#[async_trait]
pub trait SalesChannelApi: Send + Sync {
    /// Resolve (or create) the local wallet identity.
    async fn identity(&self) -> Result<Identity, ChannelError>;

    /// Create a channel owned by the local wallet and make it the active one.
    async fn create_channel(
        &self,
        name: &str,
        products: Vec<ProductInput>,
    ) -> Result<ChannelId, ChannelError>;

    /// Add stock lines to the active channel, one submission per line.
    async fn add_inventory(&self, items: Vec<InventoryInput>)
        -> Result<BatchOutcome, ChannelError>;

    /// Move stock from the local wallet to another seller.
    async fn move_inventory(
        &self,
        to_address: &str,
        product: &str,
        amount: &str,
    ) -> Result<TxHash, ChannelError>;

    /// Add sellers to the active channel, one submission per seller.
    async fn add_sellers(&self, sellers: Vec<String>) -> Result<BatchOutcome, ChannelError>;

    /// Extend the active channel's catalog.
    async fn add_products(&self, products: Vec<ProductInput>) -> Result<TxHash, ChannelError>;

    /// Record a sale on the active channel.
    async fn record_sale(
        &self,
        lines: Vec<SaleLine>,
        payment: &str,
        station: Option<String>,
    ) -> Result<TxHash, ChannelError>;

    /// Reconcile a channel against the ledger.
    async fn reconcile(&self, channel_id: &str) -> Result<Reconciliation, ChannelError>;

    /// Reconcile the active channel.
    async fn reconcile_active(&self) -> Result<Reconciliation, ChannelError>;

    /// Join an existing channel as owner or seller and make it active.
    async fn join_channel(&self, channel_id: &str) -> Result<Reconciliation, ChannelError>;
}

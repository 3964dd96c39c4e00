//! Adapter wiring: file store, keystore and HTTP ledger behind the service.

use std::sync::Arc;

use anyhow::{Context, Result};
use sales_channel::{
    ChannelConfig, HttpLedgerClient, JsonFileStore, SalesChannelService, Secp256k1Keystore,
    SystemTimeSource,
};
use tracing::info;

/// Build a service over the production adapters.
pub async fn build_service(config: ChannelConfig) -> Result<SalesChannelService> {
    config.validate().context("invalid configuration")?;

    let store = Arc::new(
        JsonFileStore::open(&config.store_path)
            .await
            .with_context(|| format!("failed to open store {}", config.store_path.display()))?,
    );
    let ledger = HttpLedgerClient::new(&config).context("failed to build ledger client")?;

    info!(
        l0 = %config.l0_url,
        data_l1 = %config.data_l1_url,
        store = %config.store_path.display(),
        "Sales channel client ready"
    );

    SalesChannelService::new(
        config,
        Arc::new(Secp256k1Keystore::new(store.clone())),
        Arc::new(ledger),
        store,
        Arc::new(SystemTimeSource),
    )
    .context("failed to start service")
}

//! Session state kept between runs: active channel, onboarding, seller roster.

use std::sync::Arc;

use crate::domain::{Address, BuildContext, ChannelError, ChannelId, Identity};
use crate::ports::{KeyValueStore, TimeSource};

/// Active channel id.
pub const SALES_CHANNEL_KEY: &str = "salesChannel";
/// `"true"` once the wallet has created or joined a channel.
pub const ONBOARDED_KEY: &str = "isOnboarded";
/// JSON array of the last-known seller roster.
pub const SELLERS_KEY: &str = "sellers";

/// Typed access to session keys.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn active_channel(&self) -> Result<Option<ChannelId>, ChannelError> {
        Ok(self
            .store
            .get(SALES_CHANNEL_KEY)
            .await?
            .filter(|id| !id.trim().is_empty()))
    }

    pub async fn set_active_channel(&self, channel_id: &str) -> Result<(), ChannelError> {
        self.store
            .set(SALES_CHANNEL_KEY, channel_id.to_string())
            .await
    }

    pub async fn clear_active_channel(&self) -> Result<(), ChannelError> {
        self.store.remove(SALES_CHANNEL_KEY).await
    }

    pub async fn is_onboarded(&self) -> Result<bool, ChannelError> {
        Ok(self.store.get(ONBOARDED_KEY).await?.as_deref() == Some("true"))
    }

    pub async fn mark_onboarded(&self) -> Result<(), ChannelError> {
        self.store.set(ONBOARDED_KEY, "true".to_string()).await
    }

    pub async fn last_known_sellers(&self) -> Result<Vec<Address>, ChannelError> {
        match self.store.get(SELLERS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| ChannelError::Storage(format!("corrupt seller roster: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    pub async fn set_last_known_sellers(&self, sellers: &[Address]) -> Result<(), ChannelError> {
        let raw = serde_json::to_string(sellers).map_err(|e| ChannelError::Storage(e.to_string()))?;
        self.store.set(SELLERS_KEY, raw).await
    }

    /// Builder context for `identity` at the current clock.
    pub async fn build_context(
        &self,
        identity: &Identity,
        clock: &dyn TimeSource,
    ) -> Result<BuildContext, ChannelError> {
        Ok(BuildContext {
            channel_id: self.active_channel().await?,
            address: identity.address.clone(),
            timestamp: clock.now(),
        })
    }
}

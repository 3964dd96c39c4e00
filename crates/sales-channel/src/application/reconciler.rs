//! # State Reconciler
//!
//! Replaces the cached projection of a channel with the ledger's snapshot.
//!
//! ## Cache Rules
//!
//! | Fetch result | Role | Cache |
//! |--------------|------|-------|
//! | snapshot | Owner / Seller | replaced (single write) |
//! | snapshot | NotAMember | untouched |
//! | error | - | untouched |

use std::sync::Arc;

use channel_telemetry::{log_event, RECONCILIATIONS};
use tracing::instrument;

use crate::application::cache::ChannelCache;
use crate::domain::{CachedChannel, Channel, ChannelError, Reconciliation};
use crate::ports::LedgerGateway;

/// Reconciles channels against the ledger.
pub struct StateReconciler {
    ledger: Arc<dyn LedgerGateway>,
    cache: ChannelCache,
}

impl StateReconciler {
    pub fn new(ledger: Arc<dyn LedgerGateway>, cache: ChannelCache) -> Self {
        Self { ledger, cache }
    }

    /// Fetch `channel_id`, classify `caller`, and refresh the cache for members.
    #[instrument(skip(self))]
    pub async fn reconcile(
        &self,
        channel_id: &str,
        caller: &str,
    ) -> Result<Reconciliation, ChannelError> {
        let result = self.fetch_checked(channel_id).await;
        let channel = match result {
            Ok(channel) => channel,
            Err(error) => {
                RECONCILIATIONS.with_label_values(&["error"]).inc();
                log_event!(warn, "reconciler", "Reconciliation failed",
                    channel_id = %channel_id, error = %error);
                return Err(error);
            }
        };

        let role = channel.role_of(caller);
        if role.is_member() {
            self.cache.put(&channel).await?;
        }

        RECONCILIATIONS.with_label_values(&[role.as_str()]).inc();
        log_event!(debug, "reconciler", "Channel reconciled",
            channel_id = %channel_id, role = role.as_str(), sellers = channel.sellers.len());

        Ok(Reconciliation { channel, role })
    }

    async fn fetch_checked(&self, channel_id: &str) -> Result<Channel, ChannelError> {
        let mut channel = self.ledger.fetch_channel(channel_id).await?;
        if channel.id.is_empty() {
            channel.id = channel_id.to_string();
        }
        if channel.id != channel_id {
            return Err(ChannelError::MalformedResponse(format!(
                "asked for channel {channel_id}, got {}",
                channel.id
            )));
        }
        channel.validate()?;
        Ok(channel)
    }

    /// Last reconciled projection of a channel.
    pub async fn cached(&self, channel_id: &str) -> Result<Option<CachedChannel>, ChannelError> {
        self.cache.get(channel_id).await
    }
}

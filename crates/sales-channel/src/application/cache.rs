//! Local cached projection of channels, stored as JSON under `channel/{id}`.

use std::sync::Arc;

use crate::domain::{CachedChannel, Channel, ChannelError};
use crate::ports::{KeyValueStore, TimeSource};

/// Store key of a cached channel.
pub fn cache_key(channel_id: &str) -> String {
    format!("channel/{channel_id}")
}

/// Channel cache over a [`KeyValueStore`].
#[derive(Clone)]
pub struct ChannelCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn TimeSource>,
}

impl ChannelCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn TimeSource>) -> Self {
        Self { store, clock }
    }

    /// Cached entry, if any.
    pub async fn get(&self, channel_id: &str) -> Result<Option<CachedChannel>, ChannelError> {
        let Some(raw) = self.store.get(&cache_key(channel_id)).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ChannelError::Storage(format!("corrupt cache entry {channel_id}: {e}")))
    }

    /// Replace the entry for `channel.id` in one write.
    pub async fn put(&self, channel: &Channel) -> Result<(), ChannelError> {
        let entry = CachedChannel {
            channel: channel.clone(),
            fetched_at: self.clock.now(),
        };
        let raw = serde_json::to_string(&entry).map_err(|e| ChannelError::Storage(e.to_string()))?;
        self.store.set(&cache_key(&channel.id), raw).await
    }

    /// Drop the entry for a channel.
    pub async fn evict(&self, channel_id: &str) -> Result<(), ChannelError> {
        self.store.remove(&cache_key(channel_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::ports::MockTimeSource;

    #[tokio::test]
    async fn test_put_get_evict() {
        let clock = Arc::new(MockTimeSource::new(42));
        let cache = ChannelCache::new(Arc::new(InMemoryStore::new()), clock);
        let channel = Channel {
            id: "c1".into(),
            owner: "DAG_OWNER".into(),
            ..Default::default()
        };

        assert_eq!(cache.get("c1").await.unwrap(), None);
        cache.put(&channel).await.unwrap();

        let cached = cache.get("c1").await.unwrap().unwrap();
        assert_eq!(cached.channel, channel);
        assert_eq!(cached.fetched_at, 42);

        cache.evict("c1").await.unwrap();
        assert_eq!(cache.get("c1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_storage_error() {
        let store = InMemoryStore::new().with_entry(cache_key("c1"), "{");
        let cache = ChannelCache::new(Arc::new(store), Arc::new(MockTimeSource::new(0)));
        assert!(matches!(
            cache.get("c1").await,
            Err(ChannelError::Storage(_))
        ));
    }
}

//! # Outbound Ports
//!
//! Traits for external dependencies: keystore, ledger, local storage, clock.

use crate::domain::{ChannelError, ChannelSnapshot, Command, Proof, TimestampMillis, TxHash};
use async_trait::async_trait;
use dag_crypto::{DagPublicKey, DagSignature};
use std::sync::atomic::{AtomicU64, Ordering};

/// Holder of the wallet secret - outbound port.
///
/// The secret never leaves the implementation; callers only see the public
/// key and signatures.
#[async_trait]
pub trait Keystore: Send + Sync {
    /// Public key of the stored secret, if any.
    async fn load(&self) -> Result<Option<DagPublicKey>, ChannelError>;

    /// Create and persist a new secret.
    async fn generate(&self) -> Result<DagPublicKey, ChannelError>;

    /// Data-sign a base64 message with the stored secret.
    async fn sign(&self, message: &[u8]) -> Result<DagSignature, ChannelError>;
}

/// Remote ledger - outbound port.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Submit a signed command; returns the ledger hash.
    async fn submit(&self, command: &Command, proof: &Proof) -> Result<TxHash, ChannelError>;

    /// Fetch the authoritative snapshot of a channel.
    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelSnapshot, ChannelError>;
}

/// Persistent string key-value store - outbound port.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a key.
    async fn get(&self, key: &str) -> Result<Option<String>, ChannelError>;

    /// Write a key.
    async fn set(&self, key: &str, value: String) -> Result<(), ChannelError>;

    /// Delete a key. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), ChannelError>;
}

/// Time source for the client clock.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> TimestampMillis;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> TimestampMillis {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as TimestampMillis
    }
}

/// Manually driven clock for tests.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    time: AtomicU64,
}

impl MockTimeSource {
    pub fn new(initial: TimestampMillis) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time: TimestampMillis) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> TimestampMillis {
        self.time.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_source() {
        let now = SystemTimeSource.now();
        // After Jan 1, 2020
        assert!(now > 1_577_836_800_000);
    }

    #[test]
    fn test_mock_time_source() {
        let clock = MockTimeSource::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now(), 1_500);
        clock.set(42);
        assert_eq!(clock.now(), 42);
    }
}

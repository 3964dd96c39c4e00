//! secp256k1 keystore persisting the wallet secret in the key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use dag_crypto::{DagKeyPair, DagPublicKey, DagSignature};
use parking_lot::RwLock;
use tracing::info;

use crate::domain::ChannelError;
use crate::ports::{KeyValueStore, Keystore};

/// Store key holding the hex secret.
pub const WALLET_PRIVATE_KEY: &str = "walletPrivateKey";

/// [`Keystore`] backed by a [`KeyValueStore`].
pub struct Secp256k1Keystore {
    store: Arc<dyn KeyValueStore>,
    keypair: RwLock<Option<Arc<DagKeyPair>>>,
}

impl Secp256k1Keystore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            keypair: RwLock::new(None),
        }
    }

    async fn keypair(&self) -> Result<Option<Arc<DagKeyPair>>, ChannelError> {
        if let Some(keypair) = self.keypair.read().clone() {
            return Ok(Some(keypair));
        }

        let Some(secret) = self.store.get(WALLET_PRIVATE_KEY).await? else {
            return Ok(None);
        };
        let keypair = DagKeyPair::from_hex(&secret)
            .map_err(|e| ChannelError::IdentityUnavailable(format!("stored key unusable: {e}")))?;

        let keypair = Arc::new(keypair);
        *self.keypair.write() = Some(keypair.clone());
        Ok(Some(keypair))
    }
}

#[async_trait]
impl Keystore for Secp256k1Keystore {
    async fn load(&self) -> Result<Option<DagPublicKey>, ChannelError> {
        Ok(self.keypair().await?.map(|keypair| keypair.public_key()))
    }

    async fn generate(&self) -> Result<DagPublicKey, ChannelError> {
        let keypair = DagKeyPair::generate();
        self.store
            .set(WALLET_PRIVATE_KEY, keypair.to_hex().as_str().to_owned())
            .await
            .map_err(|e| ChannelError::IdentityUnavailable(format!("cannot persist key: {e}")))?;

        let public_key = keypair.public_key();
        info!(address = %public_key.address(), "Generated new wallet key");
        *self.keypair.write() = Some(Arc::new(keypair));
        Ok(public_key)
    }

    async fn sign(&self, message: &[u8]) -> Result<DagSignature, ChannelError> {
        let keypair = self
            .keypair()
            .await?
            .ok_or_else(|| ChannelError::IdentityUnavailable("no wallet key".into()))?;
        Ok(keypair.data_sign(message)?)
    }
}

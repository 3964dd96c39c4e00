//! Wallet identity resolution and signing delegation.

use std::sync::Arc;

use dag_crypto::DagSignature;
use tokio::sync::OnceCell;
use tracing::{info, instrument};

use crate::domain::{ChannelError, Identity};
use crate::ports::Keystore;

/// Resolves the local wallet identity once per process and signs through the
/// keystore.
pub struct IdentityProvider {
    keystore: Arc<dyn Keystore>,
    identity: OnceCell<Identity>,
}

impl IdentityProvider {
    pub fn new(keystore: Arc<dyn Keystore>) -> Self {
        Self {
            keystore,
            identity: OnceCell::new(),
        }
    }

    /// Load the stored key, generating one on first use.
    ///
    /// The result is memoized; later calls never touch the keystore.
    #[instrument(skip(self))]
    pub async fn ensure_identity(&self) -> Result<Identity, ChannelError> {
        self.identity
            .get_or_try_init(|| async {
                let public_key = match self.keystore.load().await.map_err(unavailable)? {
                    Some(public_key) => public_key,
                    None => {
                        info!("No wallet key found, generating one");
                        self.keystore.generate().await.map_err(unavailable)?
                    }
                };
                let identity = Identity::from_public_key(public_key);
                info!(address = %identity.address, "Wallet identity resolved");
                Ok::<_, ChannelError>(identity)
            })
            .await
            .cloned()
    }

    /// Identity if already resolved.
    pub fn cached(&self) -> Option<&Identity> {
        self.identity.get()
    }

    /// Sign an opaque message with the wallet key.
    pub async fn sign(&self, message: &[u8]) -> Result<DagSignature, ChannelError> {
        self.keystore.sign(message).await.map_err(|e| match e {
            ChannelError::IdentityUnavailable(_) | ChannelError::SigningFailed(_) => e,
            other => ChannelError::SigningFailed(other.to_string()),
        })
    }
}

fn unavailable(err: ChannelError) -> ChannelError {
    match err {
        ChannelError::IdentityUnavailable(_) => err,
        other => ChannelError::IdentityUnavailable(other.to_string()),
    }
}

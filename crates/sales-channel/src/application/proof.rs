//! Proof generation over the canonical command encoding.

use std::sync::Arc;

use tracing::debug;

use crate::algorithms::signing_message;
use crate::application::identity::IdentityProvider;
use crate::domain::{ChannelError, Command, Identity, Proof};

/// Signs commands on behalf of the local identity.
pub struct ProofGenerator {
    identity: Arc<IdentityProvider>,
}

impl ProofGenerator {
    pub fn new(identity: Arc<IdentityProvider>) -> Self {
        Self { identity }
    }

    /// Encode `command` canonically and sign it as `identity`.
    ///
    /// `identity` must be the wallet identity; the proof id and the signature
    /// then always belong to the same key.
    pub async fn prove(&self, command: &Command, identity: &Identity) -> Result<Proof, ChannelError> {
        let signer = self.identity.ensure_identity().await?;
        if signer != *identity {
            return Err(ChannelError::SigningFailed(format!(
                "{} is not the wallet identity {}",
                identity.address, signer.address
            )));
        }

        let message = signing_message(command)?;
        let signature = self.identity.sign(message.as_bytes()).await?;
        debug!(command = %command.kind(), signer = %signer.address, "Command signed");

        Ok(Proof {
            id: signer.proof_id(),
            signature: signature.to_der_hex(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryStore, JsonFileStore, Secp256k1Keystore};
    use crate::algorithms::verify_proof;
    use crate::domain::AddSeller;

    fn add_seller(address: &str) -> Command {
        Command::AddSeller(AddSeller {
            channel_id: "c".into(),
            address: address.into(),
            seller: "DAG1".into(),
        })
    }

    #[tokio::test]
    async fn test_proof_verifies_against_command() {
        let identity = Arc::new(IdentityProvider::new(Arc::new(Secp256k1Keystore::new(
            Arc::new(InMemoryStore::new()),
        ))));
        let me = identity.ensure_identity().await.unwrap();
        let generator = ProofGenerator::new(identity);

        let command = add_seller(&me.address);
        let proof = generator.prove(&command, &me).await.unwrap();

        assert_eq!(proof.id.len(), 128);
        assert_eq!(proof.id, me.proof_id());
        assert!(verify_proof(&command, &proof).is_ok());
    }

    #[tokio::test]
    async fn test_foreign_identity_is_refused() {
        let identity = Arc::new(IdentityProvider::new(Arc::new(Secp256k1Keystore::new(
            Arc::new(InMemoryStore::new()),
        ))));
        let generator = ProofGenerator::new(identity);
        let stranger = Identity::from_public_key(dag_crypto::DagKeyPair::generate().public_key());

        // A proof claiming the stranger's id would never verify
        let err = generator
            .prove(&add_seller(&stranger.address), &stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::SigningFailed(_)));
    }

    #[tokio::test]
    async fn test_unavailable_key_fails_before_signing() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("wallet");
        let store = Arc::new(JsonFileStore::open(parent.join("store.json")).await.unwrap());
        std::fs::write(&parent, b"not a directory").unwrap();

        let identity = Arc::new(IdentityProvider::new(Arc::new(Secp256k1Keystore::new(store))));
        let generator = ProofGenerator::new(identity);

        let stranger = Identity::from_public_key(dag_crypto::DagKeyPair::generate().public_key());
        let err = generator
            .prove(&add_seller(&stranger.address), &stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::IdentityUnavailable(_)));
    }
}

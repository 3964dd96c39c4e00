//! # Canonical Encoding
//!
//! Bytes a proof signs over:
//!
//! ```text
//! Command ──serde_json (compact, declaration order)──► JSON
//!         ──base64──► message
//! ```
//!
//! The keystore frames `message` with the Constellation data prefix, hashes it
//! with SHA-512 and signs the leading 32 bytes (see [`dag_crypto::signing`]).
//! The ledger decodes `value`, re-encodes it the same way and verifies, so the
//! JSON must be byte-stable: no pretty printing, no map reordering.

use crate::domain::{ChannelError, Command, Proof};
use dag_crypto::{CryptoError, DagPublicKey, DagSignature};
use serde::Serialize;

/// Compact JSON of a command.
pub fn canonical_bytes(command: &Command) -> Result<Vec<u8>, ChannelError> {
    serde_json::to_vec(command)
        .map_err(|e| ChannelError::SigningFailed(format!("encoding failed: {e}")))
}

/// Base64 message handed to the signer.
pub fn signing_message(command: &Command) -> Result<String, ChannelError> {
    Ok(dag_crypto::encode_payload(&canonical_bytes(command)?))
}

/// Check that `proof` is a valid signature over `command`.
pub fn verify_proof(command: &Command, proof: &Proof) -> Result<(), CryptoError> {
    let public_key = DagPublicKey::from_hex(&proof.id)?;
    let signature = DagSignature::from_der_hex(&proof.signature)?;
    let message = serde_json::to_vec(command)
        .map(|json| dag_crypto::encode_payload(&json))
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    public_key.verify_data(message.as_bytes(), &signature)
}

/// Body of a data-update POST.
#[derive(Debug, Serialize)]
pub struct SignedSubmission<'a> {
    pub value: &'a Command,
    pub proofs: [&'a Proof; 1],
}

impl<'a> SignedSubmission<'a> {
    pub fn new(value: &'a Command, proof: &'a Proof) -> Self {
        Self {
            value,
            proofs: [proof],
        }
    }
}

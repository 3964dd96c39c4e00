//! # ECDSA Wallet Keys (secp256k1)
//!
//! Wallet key pairs, uncompressed public keys and DER signatures.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization
//! - Secret scalar zeroized on drop (`SigningKey` is `ZeroizeOnDrop`)
//!
//! ## Use Cases
//!
//! - Signing metagraph data updates (see [`crate::signing`])
//! - Deriving `DAG…` wallet addresses
//! - Building proof identifiers (public key without the SEC1 tag byte)

use crate::signing::data_digest;
use crate::CryptoError;
use k256::ecdsa::{
    signature::hazmat::{PrehashSigner, PrehashVerifier},
    Signature, SigningKey, VerifyingKey,
};
use zeroize::{Zeroize, Zeroizing};

/// Length of an uncompressed SEC1 public key (tag byte + X + Y).
pub const UNCOMPRESSED_KEY_LEN: usize = 65;

/// Length of a hex proof identifier (X ‖ Y without the tag byte).
pub const PROOF_ID_HEX_LEN: usize = 128;

/// Uncompressed secp256k1 public key (65 bytes, starting with 0x04).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DagPublicKey([u8; UNCOMPRESSED_KEY_LEN]);

impl DagPublicKey {
    /// Parse a public key.
    ///
    /// Accepts the 65-byte uncompressed form, the 33-byte compressed form, or
    /// the 64-byte raw `X ‖ Y` form used as a proof identifier.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let verifying_key = if bytes.len() == UNCOMPRESSED_KEY_LEN - 1 {
            let mut tagged = [0u8; UNCOMPRESSED_KEY_LEN];
            tagged[0] = 0x04;
            tagged[1..].copy_from_slice(bytes);
            VerifyingKey::from_sec1_bytes(&tagged)
        } else {
            VerifyingKey::from_sec1_bytes(bytes)
        }
        .map_err(|_| CryptoError::InvalidPublicKey)?;

        Ok(Self::from_verifying_key(&verifying_key))
    }

    /// Parse a hex-encoded public key (any form accepted by [`Self::from_bytes`]).
    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&hex::decode(encoded)?)
    }

    fn from_verifying_key(verifying_key: &VerifyingKey) -> Self {
        let point = verifying_key.to_encoded_point(false);
        // Uncompressed SEC1 encoding of a non-identity point is always 65 bytes
        let mut bytes = [0u8; UNCOMPRESSED_KEY_LEN];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }

    /// Get raw uncompressed bytes.
    pub fn as_bytes(&self) -> &[u8; UNCOMPRESSED_KEY_LEN] {
        &self.0
    }

    /// Hex of the full uncompressed key (130 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Proof identifier: hex of the key with the 0x04 tag stripped.
    ///
    /// Always exactly [`PROOF_ID_HEX_LEN`] characters.
    pub fn to_proof_id(&self) -> String {
        hex::encode(&self.0[1..])
    }

    /// Wallet address derived from this key.
    pub fn address(&self) -> String {
        crate::address::dag_address(self)
    }

    /// Verify a data-update signature over `message` (the base64 payload).
    pub fn verify_data(&self, message: &[u8], signature: &DagSignature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let digest = data_digest(message);

        verifying_key
            .verify_prehash(&digest[..32], &signature.0)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// ECDSA signature, carried on the wire as hex-encoded DER.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DagSignature(Signature);

impl DagSignature {
    /// Parse from hex-encoded DER.
    pub fn from_der_hex(encoded: &str) -> Result<Self, CryptoError> {
        let der = hex::decode(encoded)?;
        let signature = Signature::from_der(&der).map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(signature))
    }

    /// Hex-encoded DER form.
    pub fn to_der_hex(&self) -> String {
        hex::encode(self.0.to_der().as_bytes())
    }

    /// Compact `r ‖ s` bytes.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes().into()
    }
}

/// secp256k1 wallet key pair.
pub struct DagKeyPair {
    signing_key: SigningKey,
}

impl DagKeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create from a hex-encoded secret key (64 characters).
    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(hex::decode(encoded.trim())?);
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Hex-encoded secret key, for handing to a persistent keystore.
    pub fn to_hex(&self) -> Zeroizing<String> {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        let encoded = Zeroizing::new(hex::encode(bytes));
        bytes.zeroize();
        encoded
    }

    /// Get public key (uncompressed).
    pub fn public_key(&self) -> DagPublicKey {
        DagPublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Wallet address of this key pair.
    pub fn address(&self) -> String {
        self.public_key().address()
    }

    /// Sign a data-update message (deterministic RFC 6979).
    ///
    /// `message` is the base64 payload; framing and hashing happen here.
    pub fn data_sign(&self, message: &[u8]) -> Result<DagSignature, CryptoError> {
        let digest = data_digest(message);
        let signature: Signature = self
            .signing_key
            .sign_prehash(&digest[..32])
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(DagSignature(signature.normalize_s().unwrap_or(signature)))
    }
}

impl std::fmt::Debug for DagKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DagKeyPair")
            .field("public_key", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

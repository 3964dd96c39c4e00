//! # DAG Crypto - Wallet Key Primitives
//!
//! Key material and signing for Constellation-style DAG wallets.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 | Wallet keys, data-update signatures |
//! | `address` | SHA-256 + Base58 | `DAG…` wallet addresses |
//! | `signing` | Base64 + SHA-512 framing | Signed data-application payloads |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalization
//! - **Secret keys**: zeroized on drop, exported only as zeroizing hex

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod ecdsa;
pub mod errors;
pub mod signing;

// Re-exports
pub use address::{dag_address, is_valid_dag_address};
pub use ecdsa::{DagKeyPair, DagPublicKey, DagSignature};
pub use errors::CryptoError;
pub use signing::{data_digest, encode_payload, frame_message, DATA_SIGN_PREFIX};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}

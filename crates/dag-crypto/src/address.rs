//! # DAG Wallet Addresses
//!
//! ```text
//! SHA-256(PKCS#8 SPKI prefix ‖ uncompressed key) ──Base58──→ last 36 chars = T
//! address = "DAG" ‖ (sum of decimal digits in T mod 9) ‖ T
//! ```

use crate::ecdsa::DagPublicKey;
use sha2::{Digest, Sha256};

/// DER SubjectPublicKeyInfo header for an uncompressed secp256k1 key.
const PKCS_PREFIX: [u8; 23] = [
    0x30, 0x56, 0x30, 0x10, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x05, 0x2b,
    0x81, 0x04, 0x00, 0x0a, 0x03, 0x42, 0x00,
];

/// Address prefix.
pub const DAG_PREFIX: &str = "DAG";

/// Number of Base58 characters kept from the hash.
const TAIL_LEN: usize = 36;

/// Derive the wallet address of a public key.
pub fn dag_address(public_key: &DagPublicKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(PKCS_PREFIX);
    hasher.update(public_key.as_bytes());
    let encoded = bs58::encode(hasher.finalize()).into_string();

    let tail = &encoded[encoded.len().saturating_sub(TAIL_LEN)..];
    format!("{DAG_PREFIX}{}{tail}", parity_digit(tail))
}

/// Structural check of a `DAG…` address: prefix, length, alphabet, parity.
pub fn is_valid_dag_address(address: &str) -> bool {
    let Some(rest) = address.strip_prefix(DAG_PREFIX) else {
        return false;
    };
    let mut chars = rest.chars();
    let Some(parity) = chars.next().and_then(|c| c.to_digit(10)) else {
        return false;
    };
    let tail = chars.as_str();

    tail.len() == TAIL_LEN
        && bs58::decode(tail).into_vec().is_ok()
        && parity == parity_digit(tail)
}

fn parity_digit(tail: &str) -> u32 {
    tail.chars().filter_map(|c| c.to_digit(10)).sum::<u32>() % 9
}

//! # Data-Update Framing
//!
//! Metagraph data applications verify a signature over a framed message
//! rather than over the raw payload:
//!
//! ```text
//! payload bytes ──base64──→ M
//! "\x19Constellation Signed Data:\n" ‖ len(M) ‖ "\n" ‖ M ──SHA-512──→ digest
//! ECDSA-secp256k1(digest[..32])
//! ```
//!
//! The 32-byte truncation matches what the wallet SDK's signer does when it
//! is handed a 64-byte digest for a 256-bit curve.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha512};

/// Prefix prepended to every signed data message.
pub const DATA_SIGN_PREFIX: &str = "\u{19}Constellation Signed Data:\n";

/// Base64-encode a serialized payload (the message handed to the signer).
pub fn encode_payload(payload: &[u8]) -> String {
    STANDARD.encode(payload)
}

/// Frame a message with the data-signing prefix and its length.
pub fn frame_message(message: &[u8]) -> Vec<u8> {
    let length = message.len().to_string();
    let mut framed = Vec::with_capacity(DATA_SIGN_PREFIX.len() + length.len() + 1 + message.len());
    framed.extend_from_slice(DATA_SIGN_PREFIX.as_bytes());
    framed.extend_from_slice(length.as_bytes());
    framed.push(b'\n');
    framed.extend_from_slice(message);
    framed
}

/// SHA-512 over the framed message.
pub fn data_digest(message: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(frame_message(message));
    hasher.finalize().into()
}

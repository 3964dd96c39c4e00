//! # Domain Value Objects
//!
//! Immutable value types shared across the pipeline.

use dag_crypto::DagPublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// DAG wallet address (`DAG…`).
pub type Address = String;

/// Opaque channel identifier assigned by the ledger.
pub type ChannelId = String;

/// Transaction hash returned by the ledger on submission.
pub type TxHash = String;

/// Client clock in epoch milliseconds.
pub type TimestampMillis = u64;

/// Largest integer an IEEE-754 double represents exactly. Larger values would
/// serialize in exponent form (`1e16`), which other JSON encoders write out in
/// full, so caller input above it is rejected.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Non-negative numeric payload field (price, amount).
///
/// Whole values serialize as JSON integers (`5`, not `5.0`) so the signed
/// bytes match what the ledger re-encodes for verification.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Amount(f64);

impl Amount {
    /// Wrap a finite, non-negative value. Returns `None` otherwise.
    pub fn new(value: f64) -> Option<Self> {
        // -0.0 normalizes to 0.0
        (value.is_finite() && value >= 0.0).then_some(Self(value + 0.0))
    }

    /// Underlying value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0 <= MAX_SAFE_INTEGER {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Amount::new(value)
            .ok_or_else(|| serde::de::Error::custom("amount must be finite and non-negative"))
    }
}

/// Signature proof attached to a ledger write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Signer public key without the SEC1 tag byte (128 hex chars).
    pub id: String,
    /// Hex DER signature.
    pub signature: String,
}

/// Local wallet identity.
///
/// Holds no secret material; signing is delegated to the keystore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Wallet address derived from the key.
    pub address: Address,
    /// Uncompressed secp256k1 public key.
    pub public_key: DagPublicKey,
}

impl Identity {
    /// Build an identity from a public key.
    pub fn from_public_key(public_key: DagPublicKey) -> Self {
        Self {
            address: public_key.address(),
            public_key,
        }
    }

    /// Proof identifier of this identity.
    pub fn proof_id(&self) -> String {
        self.public_key.to_proof_id()
    }
}

/// Caller's relation to a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Caller created the channel.
    Owner,
    /// Caller is on the seller roster.
    Seller,
    /// Caller has no relation to the channel.
    NotAMember,
}

impl Role {
    /// Owner or seller.
    pub fn is_member(self) -> bool {
        !matches!(self, Role::NotAMember)
    }

    /// Lowercase label, used for metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Seller => "seller",
            Role::NotAMember => "not_a_member",
        }
    }
}

/// Queue-assigned submission sequence number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
